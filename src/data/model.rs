use std::fmt;

use chrono::{NaiveDateTime, NaiveTime};

// ---------------------------------------------------------------------------
// CellValue – a single cell of the story table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring common spreadsheet dtypes.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    /// Canonical date-time, produced for the date role at load time or read
    /// natively from workbooks and Parquet files.
    Date(NaiveDateTime),
    Null,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Date(d) => {
                if d.time() == NaiveTime::MIN {
                    write!(f, "{}", d.format("%Y-%m-%d"))
                } else {
                    write!(f, "{}", d.format("%Y-%m-%d %H:%M:%S"))
                }
            }
            CellValue::Null => Ok(()),
        }
    }
}

impl CellValue {
    pub fn as_date(&self) -> Option<NaiveDateTime> {
        match self {
            CellValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Text view of the cell; missing values become the empty string.
    pub fn to_text(&self) -> String {
        self.to_string()
    }
}

// ---------------------------------------------------------------------------
// Story – one row of the table
// ---------------------------------------------------------------------------

/// A single story (one row of the source table). Cells are positional and
/// line up with [`StoryTable::columns`].
#[derive(Debug, Clone, PartialEq)]
pub struct Story {
    pub cells: Vec<CellValue>,
}

impl Story {
    pub fn cell(&self, index: usize) -> &CellValue {
        static NULL: CellValue = CellValue::Null;
        self.cells.get(index).unwrap_or(&NULL)
    }
}

// ---------------------------------------------------------------------------
// StoryTable – the complete loaded table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoryTable {
    /// Column names in file order. Duplicates are kept as supplied.
    pub columns: Vec<String>,
    /// All stories (rows).
    pub stories: Vec<Story>,
}

impl StoryTable {
    pub fn new(columns: Vec<String>, stories: Vec<Story>) -> Self {
        StoryTable { columns, stories }
    }

    /// Position of the first column with the given name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Trim surrounding whitespace from every column name.
    pub fn standardize_columns(mut self) -> Self {
        for col in &mut self.columns {
            let trimmed = col.trim();
            if trimmed.len() != col.len() {
                *col = trimmed.to_string();
            }
        }
        self
    }

    /// New table holding the given rows, in the given order.
    pub fn subset(&self, indices: &[usize]) -> StoryTable {
        StoryTable {
            columns: self.columns.clone(),
            stories: indices
                .iter()
                .filter_map(|&i| self.stories.get(i).cloned())
                .collect(),
        }
    }

    /// Number of stories.
    pub fn len(&self) -> usize {
        self.stories.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.stories.is_empty()
    }
}

/// Header name for column `index`, naming blank headers like spreadsheet
/// tools do.
pub fn header_name(raw: &str, index: usize) -> String {
    if raw.trim().is_empty() {
        format!("Unnamed: {index}")
    } else {
        raw.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn date_display_omits_midnight() {
        assert_eq!(CellValue::Date(date(2024, 1, 5)).to_string(), "2024-01-05");
        let with_time = NaiveDate::from_ymd_opt(2024, 1, 5)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        assert_eq!(
            CellValue::Date(with_time).to_string(),
            "2024-01-05 09:30:00"
        );
    }

    #[test]
    fn null_renders_empty() {
        assert_eq!(CellValue::Null.to_text(), "");
    }

    #[test]
    fn standardize_trims_but_keeps_duplicates() {
        let table = StoryTable::new(
            vec!["  Date ".into(), "Title".into(), "Title ".into()],
            Vec::new(),
        )
        .standardize_columns();
        assert_eq!(table.columns, vec!["Date", "Title", "Title"]);
        assert_eq!(table.column_index("Title"), Some(1));
    }

    #[test]
    fn missing_cells_read_as_null() {
        let story = Story {
            cells: vec![CellValue::Integer(1)],
        };
        assert_eq!(story.cell(0), &CellValue::Integer(1));
        assert_eq!(story.cell(5), &CellValue::Null);
    }

    #[test]
    fn blank_headers_get_placeholder_names() {
        assert_eq!(header_name("", 3), "Unnamed: 3");
        assert_eq!(header_name("Links", 3), "Links");
    }
}
