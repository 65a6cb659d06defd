use std::path::Path;

use anyhow::{Context, Result};

use super::model::StoryTable;

/// File name offered in the save dialog.
pub const DEFAULT_EXPORT_NAME: &str = "filtered_news.csv";

/// Serialize the table as UTF-8 CSV with a header row. Dates are written as
/// `YYYY-MM-DD` (plus the time of day when there is one).
pub fn to_csv_bytes(table: &StoryTable) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(&table.columns)
        .context("writing CSV header")?;
    for (row_no, story) in table.stories.iter().enumerate() {
        let record: Vec<String> = (0..table.columns.len())
            .map(|i| story.cell(i).to_text())
            .collect();
        writer
            .write_record(&record)
            .with_context(|| format!("writing CSV row {row_no}"))?;
    }
    writer.into_inner().context("flushing CSV output")
}

/// Write the table to `path` as CSV.
pub fn save_csv(table: &StoryTable, path: &Path) -> Result<()> {
    let bytes = to_csv_bytes(table)?;
    std::fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{apply_filters, FilterCriteria};
    use crate::data::loader::load_csv_reader;
    use crate::data::model::{CellValue, Story};
    use crate::data::preprocess::prepare;

    fn table() -> StoryTable {
        let raw = load_csv_reader(
            "Date,Headline,Tags,Words,Links\n\
             2024-01-03,\"Quoted, headline\",Economy;Markets,120,https://a.example\n\
             01/09/2024,Second,Politics,80,\n"
                .as_bytes(),
        )
        .unwrap();
        prepare(raw).table
    }

    #[test]
    fn header_and_iso_dates() {
        let csv = String::from_utf8(to_csv_bytes(&table()).unwrap()).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("Date,Headline,Tags,Words,Links"));
        assert_eq!(
            lines.next(),
            Some("2024-01-03,\"Quoted, headline\",Economy;Markets,120,https://a.example")
        );
        assert_eq!(lines.next(), Some("2024-01-09,Second,Politics,80,"));
    }

    #[test]
    fn filtered_export_round_trips() {
        let original = table();
        let prepared = prepare(original.clone());
        let filtered = apply_filters(&prepared.table, &prepared.schema, &FilterCriteria::default());
        let bytes = to_csv_bytes(&filtered).unwrap();
        let reloaded = prepare(load_csv_reader(bytes.as_slice()).unwrap()).table;
        assert_eq!(reloaded.columns, filtered.columns);
        assert_eq!(reloaded.stories, filtered.stories);
    }

    #[test]
    fn empty_table_exports_header_only() {
        let empty = StoryTable::new(vec!["A".into(), "B".into()], Vec::<Story>::new());
        let csv = String::from_utf8(to_csv_bytes(&empty).unwrap()).unwrap();
        assert_eq!(csv, "A,B\n");
    }

    #[test]
    fn save_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_EXPORT_NAME);
        let table = StoryTable::new(
            vec!["Title".into()],
            vec![Story {
                cells: vec![CellValue::String("Hello".into())],
            }],
        );
        save_csv(&table, &path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "Title\nHello\n");
    }
}
