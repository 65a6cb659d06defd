use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{
    DataType, Date32Type, Date64Type, Float32Type, Float64Type, Int16Type, Int32Type, Int64Type,
    Int8Type, TimeUnit, TimestampMicrosecondType, TimestampMillisecondType,
    TimestampNanosecondType, TimestampSecondType, UInt16Type, UInt32Type, UInt64Type, UInt8Type,
};
use calamine::{open_workbook_auto, Data, DataType as _, Range, Reader};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::error::LoadError;
use super::model::{header_name, CellValue, Story, StoryTable};
use super::preprocess::text_role_columns;
use super::schema::detect_schema;

/// The bundled sample dataset.
pub const SAMPLE_CSV: &str = include_str!("../../assets/sample_data.csv");

// ---------------------------------------------------------------------------
// Where a table came from
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    Csv(PathBuf),
    Workbook {
        path: PathBuf,
        sheet: String,
        sheets: Vec<String>,
    },
    Json(PathBuf),
    Parquet(PathBuf),
    Sample,
}

impl Source {
    /// Confirmation shown after a successful load.
    pub fn loaded_message(&self) -> String {
        match self {
            Source::Csv(_) => "CSV loaded!".to_string(),
            Source::Workbook { sheet, .. } => format!("Excel loaded (sheet: {sheet})!"),
            Source::Json(_) => "JSON loaded!".to_string(),
            Source::Parquet(_) => "Parquet loaded!".to_string(),
            Source::Sample => "Sample loaded!".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a story table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`                          – header row + one story per row
/// * `.xlsx` / `.xlsm` / `.xls` / `.ods` – first worksheet, header row first
/// * `.json`                         – `[{ "Date": ..., "Headline": ... }, ...]`
/// * `.parquet`                      – any flat schema
pub fn load_file(path: &Path) -> Result<(StoryTable, Source)> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => Ok((load_csv(path)?, Source::Csv(path.to_path_buf()))),
        "xlsx" | "xlsm" | "xls" | "ods" => {
            let sheets = sheet_names(path)?;
            let first = sheets.first().cloned().ok_or(LoadError::NoWorksheets)?;
            let table = load_sheet(path, &first)?;
            Ok((
                table,
                Source::Workbook {
                    path: path.to_path_buf(),
                    sheet: first,
                    sheets,
                },
            ))
        }
        "json" => Ok((load_json(path)?, Source::Json(path.to_path_buf()))),
        "parquet" | "pq" => Ok((load_parquet(path)?, Source::Parquet(path.to_path_buf()))),
        other => bail!(LoadError::UnsupportedExtension(other.to_string())),
    }
}

/// Load the dataset compiled into the binary.
pub fn load_sample() -> Result<StoryTable> {
    load_csv_reader(SAMPLE_CSV.as_bytes()).context("parsing bundled sample data")
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<StoryTable> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    load_csv_reader(file)
}

/// Parse CSV with a header row. Short rows are padded with missing cells.
///
/// Text role columns (headline, tags and the like) keep their raw text; the
/// remaining columns get a typed guess.
pub fn load_csv_reader<R: Read>(input: R) -> Result<StoryTable> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(input);
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .enumerate()
        .map(|(i, h)| header_name(h, i))
        .collect();
    if headers.is_empty() {
        bail!(LoadError::MissingHeader);
    }
    let trimmed: Vec<String> = headers.iter().map(|h| h.trim().to_string()).collect();
    let raw_text = text_role_columns(&trimmed, &detect_schema(&trimmed));

    let mut stories = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {}", row_no + 1))?;
        if record.len() > headers.len() {
            bail!(LoadError::RaggedRow {
                row: row_no + 1,
                found: record.len(),
                expected: headers.len(),
            });
        }
        let mut cells: Vec<CellValue> = record
            .iter()
            .enumerate()
            .map(|(i, field)| {
                if !raw_text.contains(&i) {
                    guess_cell_type(field)
                } else if field.is_empty() {
                    CellValue::Null
                } else {
                    CellValue::String(field.to_string())
                }
            })
            .collect();
        cells.resize(headers.len(), CellValue::Null);
        stories.push(Story { cells });
    }

    Ok(StoryTable::new(headers, stories))
}

fn guess_cell_type(s: &str) -> CellValue {
    if s.is_empty() {
        return CellValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return CellValue::Float(f);
    }
    if s == "true" || s == "false" {
        return CellValue::Bool(s == "true");
    }
    CellValue::String(s.to_string())
}

// ---------------------------------------------------------------------------
// Workbook loader (.xlsx / .xls / .ods)
// ---------------------------------------------------------------------------

/// Worksheet names of a workbook, in workbook order.
pub fn sheet_names(path: &Path) -> Result<Vec<String>> {
    let workbook = open_workbook_auto(path)
        .map_err(|e| anyhow!("opening workbook {}: {e}", path.display()))?;
    Ok(workbook.sheet_names())
}

/// Load one worksheet; its first row holds the column names.
pub fn load_sheet(path: &Path, sheet: &str) -> Result<StoryTable> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| anyhow!("opening workbook {}: {e}", path.display()))?;
    if !workbook.sheet_names().iter().any(|s| s == sheet) {
        bail!(LoadError::SheetNotFound(sheet.to_string()));
    }
    let range = workbook
        .worksheet_range(sheet)
        .map_err(|e| anyhow!("reading worksheet '{sheet}': {e}"))?;
    table_from_range(&range)
}

fn table_from_range(range: &Range<Data>) -> Result<StoryTable> {
    let mut rows = range.rows();
    let header = rows.next().ok_or(LoadError::MissingHeader)?;
    let columns: Vec<String> = header
        .iter()
        .enumerate()
        .map(|(i, cell)| header_name(&cell.to_string(), i))
        .collect();

    let stories = rows
        .filter(|row| row.iter().any(|cell| !cell.is_empty()))
        .map(|row| Story {
            cells: row.iter().map(workbook_cell).collect(),
        })
        .collect();

    Ok(StoryTable::new(columns, stories))
}

fn workbook_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty | Data::Error(_) => CellValue::Null,
        Data::String(s) if s.is_empty() => CellValue::Null,
        Data::String(s) => CellValue::String(s.clone()),
        Data::Int(i) => CellValue::Integer(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(_) | Data::DateTimeIso(_) => cell
            .as_datetime()
            .map(CellValue::Date)
            .unwrap_or_else(|| CellValue::String(cell.to_string())),
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "Date": "2024-01-05", "Headline": "...", "Tags": "Politics; Elections" },
///   ...
/// ]
/// ```
///
/// Columns appear in order of first appearance; absent keys are missing cells.
fn load_json(path: &Path) -> Result<StoryTable> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    load_json_str(&text)
}

fn load_json_str(text: &str) -> Result<StoryTable> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;
    let records = root.as_array().ok_or(LoadError::NotRecords)?;

    let mut columns: Vec<String> = Vec::new();
    for rec in records {
        let obj = rec.as_object().ok_or(LoadError::NotRecords)?;
        for key in obj.keys() {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
    }
    if columns.is_empty() {
        bail!(LoadError::MissingHeader);
    }

    let stories = records
        .iter()
        .filter_map(JsonValue::as_object)
        .map(|obj| Story {
            cells: columns
                .iter()
                .map(|col| obj.get(col).map(json_to_cell).unwrap_or(CellValue::Null))
                .collect(),
        })
        .collect();

    Ok(StoryTable::new(columns, stories))
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) if s.is_empty() => CellValue::Null,
        JsonValue::String(s) => CellValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with a flat schema. Strings, integers, floats, booleans,
/// dates and timestamps map to their natural cell types; anything else is
/// rendered as text.
fn load_parquet(path: &Path) -> Result<StoryTable> {
    let file = File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let columns: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    if columns.is_empty() {
        bail!(LoadError::MissingHeader);
    }
    let reader = builder.build().context("building parquet reader")?;

    let mut stories = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for row in 0..batch.num_rows() {
            let cells = batch
                .columns()
                .iter()
                .map(|col| extract_cell(col, row))
                .collect();
            stories.push(Story { cells });
        }
    }

    Ok(StoryTable::new(columns, stories))
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &ArrayRef, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Null;
    }
    let date = |dt: Option<chrono::NaiveDateTime>| dt.map(CellValue::Date).unwrap_or(CellValue::Null);
    match col.data_type() {
        DataType::Utf8 => CellValue::String(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => CellValue::String(col.as_string::<i64>().value(row).to_string()),
        DataType::Int8 => CellValue::Integer(col.as_primitive::<Int8Type>().value(row).into()),
        DataType::Int16 => CellValue::Integer(col.as_primitive::<Int16Type>().value(row).into()),
        DataType::Int32 => CellValue::Integer(col.as_primitive::<Int32Type>().value(row).into()),
        DataType::Int64 => CellValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::UInt8 => CellValue::Integer(col.as_primitive::<UInt8Type>().value(row).into()),
        DataType::UInt16 => CellValue::Integer(col.as_primitive::<UInt16Type>().value(row).into()),
        DataType::UInt32 => CellValue::Integer(col.as_primitive::<UInt32Type>().value(row).into()),
        DataType::UInt64 => {
            let v = col.as_primitive::<UInt64Type>().value(row);
            i64::try_from(v)
                .map(CellValue::Integer)
                .unwrap_or(CellValue::Float(v as f64))
        }
        DataType::Float32 => CellValue::Float(col.as_primitive::<Float32Type>().value(row).into()),
        DataType::Float64 => CellValue::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => CellValue::Bool(col.as_boolean().value(row)),
        DataType::Date32 => date(col.as_primitive::<Date32Type>().value_as_datetime(row)),
        DataType::Date64 => date(col.as_primitive::<Date64Type>().value_as_datetime(row)),
        DataType::Timestamp(unit, _) => date(match unit {
            TimeUnit::Second => col.as_primitive::<TimestampSecondType>().value_as_datetime(row),
            TimeUnit::Millisecond => col
                .as_primitive::<TimestampMillisecondType>()
                .value_as_datetime(row),
            TimeUnit::Microsecond => col
                .as_primitive::<TimestampMicrosecondType>()
                .value_as_datetime(row),
            TimeUnit::Nanosecond => col
                .as_primitive::<TimestampNanosecondType>()
                .value_as_datetime(row),
        }),
        _ => arrow::util::display::array_value_to_string(col.as_ref(), row)
            .map(CellValue::String)
            .unwrap_or(CellValue::Null),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use arrow::array::{Date32Array, Int64Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use chrono::NaiveDate;
    use parquet::arrow::ArrowWriter;

    #[test]
    fn csv_cells_are_typed_and_padded() {
        let table = load_csv_reader(" Date ,Headline,Score,Flag\n2024-01-05,Hello,3,true\n2024-01-06,,2.5\n".as_bytes()).unwrap();
        assert_eq!(table.columns, vec![" Date ", "Headline", "Score", "Flag"]);
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.stories[0].cells,
            vec![
                CellValue::String("2024-01-05".into()),
                CellValue::String("Hello".into()),
                CellValue::Integer(3),
                CellValue::Bool(true),
            ]
        );
        assert_eq!(
            table.stories[1].cells,
            vec![
                CellValue::String("2024-01-06".into()),
                CellValue::Null,
                CellValue::Float(2.5),
                CellValue::Null,
            ]
        );
    }

    #[test]
    fn csv_rows_longer_than_header_are_rejected() {
        let err = load_csv_reader("A,B\n1,2,3\n".as_bytes()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LoadError>(),
            Some(LoadError::RaggedRow { row: 1, found: 3, expected: 2 })
        ));
    }

    #[test]
    fn empty_csv_has_no_header() {
        let err = load_csv_reader("".as_bytes()).unwrap_err();
        assert!(matches!(err.downcast_ref::<LoadError>(), Some(LoadError::MissingHeader)));
    }

    #[test]
    fn blank_csv_headers_are_named() {
        let table = load_csv_reader("Date,,Title\n".as_bytes()).unwrap();
        assert_eq!(table.columns, vec!["Date", "Unnamed: 1", "Title"]);
        assert!(table.is_empty());
    }

    #[test]
    fn unsupported_extension() {
        let err = load_file(Path::new("stories.txt")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LoadError>(),
            Some(LoadError::UnsupportedExtension(ext)) if ext == "txt"
        ));
    }

    #[test]
    fn csv_file_dispatch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Stories.CSV");
        std::fs::write(&path, "Headline\nOne\nTwo\n").unwrap();
        let (table, source) = load_file(&path).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(source, Source::Csv(path));
        assert_eq!(source.loaded_message(), "CSV loaded!");
    }

    #[test]
    fn json_records_keep_first_seen_column_order() {
        let table = load_json_str(
            r#"[{"Headline": "A", "Date": "2024-01-05", "Views": 10},
                {"Date": "2024-01-06", "Tags": "x; y", "Headline": null}]"#,
        )
        .unwrap();
        assert_eq!(table.columns, vec!["Headline", "Date", "Views", "Tags"]);
        assert_eq!(table.stories[0].cells[2], CellValue::Integer(10));
        assert_eq!(table.stories[0].cells[3], CellValue::Null);
        assert_eq!(table.stories[1].cells[0], CellValue::Null);
        assert_eq!(table.stories[1].cells[3], CellValue::String("x; y".into()));
    }

    #[test]
    fn json_must_be_records() {
        let err = load_json_str(r#"{"Headline": "A"}"#).unwrap_err();
        assert!(matches!(err.downcast_ref::<LoadError>(), Some(LoadError::NotRecords)));
        let err = load_json_str("[1, 2]").unwrap_err();
        assert!(matches!(err.downcast_ref::<LoadError>(), Some(LoadError::NotRecords)));
    }

    #[test]
    fn parquet_dates_and_scalars() {
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
        let jan5 = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        let days = (jan5 - epoch).num_days() as i32;

        let schema = Arc::new(Schema::new(vec![
            Field::new("published", DataType::Date32, true),
            Field::new("headline", DataType::Utf8, true),
            Field::new("views", DataType::Int64, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Date32Array::from(vec![Some(days), None])),
                Arc::new(StringArray::from(vec![Some("First"), Some("Second")])),
                Arc::new(Int64Array::from(vec![Some(7), None])),
            ],
        )
        .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stories.parquet");
        let file = File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let (table, source) = load_file(&path).unwrap();
        assert_eq!(source.loaded_message(), "Parquet loaded!");
        assert_eq!(table.columns, vec!["published", "headline", "views"]);
        assert_eq!(
            table.stories[0].cells,
            vec![
                CellValue::Date(jan5.and_hms_opt(0, 0, 0).unwrap()),
                CellValue::String("First".into()),
                CellValue::Integer(7),
            ]
        );
        assert_eq!(
            table.stories[1].cells,
            vec![CellValue::Null, CellValue::String("Second".into()), CellValue::Null]
        );
    }

    #[test]
    fn sample_has_all_roles() {
        let table = load_sample().unwrap();
        assert_eq!(
            table.columns,
            vec!["Date", "Headline", "Intro", "Tags", "Key Information", "Relevance", "Links"]
        );
        assert!(table.len() >= 10);
    }

    #[test]
    fn csv_role_columns_keep_raw_text() {
        let table =
            load_csv_reader("Date,Headline,Intro,Code\n2024-01-05,Infinity,1e3,007\n".as_bytes())
                .unwrap();
        assert_eq!(
            table.stories[0].cells,
            vec![
                CellValue::String("2024-01-05".into()),
                CellValue::String("Infinity".into()),
                CellValue::String("1e3".into()),
                CellValue::Integer(7),
            ]
        );
    }

    #[test]
    fn worksheet_rows_become_stories() {
        use calamine::{CellErrorType, ExcelDateTime, ExcelDateTimeType};

        let mut range = Range::new((0, 0), (3, 2));
        range.set_value((0, 0), Data::String("Date".into()));
        range.set_value((0, 2), Data::String("Headline".into()));
        range.set_value(
            (1, 0),
            Data::DateTime(ExcelDateTime::new(45296.5, ExcelDateTimeType::DateTime, false)),
        );
        range.set_value((1, 1), Data::Error(CellErrorType::Div0));
        range.set_value((1, 2), Data::String("First".into()));
        // row 2 stays blank
        range.set_value((3, 0), Data::DateTimeIso("2024-01-06T08:00:00".into()));
        range.set_value((3, 1), Data::Int(4));
        range.set_value((3, 2), Data::String(String::new()));

        let table = table_from_range(&range).unwrap();
        assert_eq!(table.columns, vec!["Date", "Unnamed: 1", "Headline"]);
        assert_eq!(table.len(), 2);

        let noon = NaiveDate::from_ymd_opt(2024, 1, 5)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        assert_eq!(
            table.stories[0].cells,
            vec![
                CellValue::Date(noon),
                CellValue::Null,
                CellValue::String("First".into()),
            ]
        );
        let morning = NaiveDate::from_ymd_opt(2024, 1, 6)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        assert_eq!(
            table.stories[1].cells,
            vec![CellValue::Date(morning), CellValue::Integer(4), CellValue::Null]
        );
    }

    #[test]
    fn empty_worksheet_has_no_header() {
        let err = table_from_range(&Range::<Data>::empty()).unwrap_err();
        assert!(matches!(err.downcast_ref::<LoadError>(), Some(LoadError::MissingHeader)));
    }

    #[test]
    fn workbook_message_names_the_sheet() {
        let source = Source::Workbook {
            path: PathBuf::from("stories.xlsx"),
            sheet: "January".into(),
            sheets: vec!["January".into(), "February".into()],
        };
        assert_eq!(source.loaded_message(), "Excel loaded (sheet: January)!");
    }

    #[test]
    fn missing_workbook_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_file(&dir.path().join("missing.xlsx")).is_err());
    }
}
