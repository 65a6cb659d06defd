use thiserror::Error;

/// Classifiable reasons a table could not be loaded.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),
    #[error("the file has no header row")]
    MissingHeader,
    #[error("worksheet '{0}' not found")]
    SheetNotFound(String),
    #[error("the workbook contains no worksheets")]
    NoWorksheets,
    #[error("row {row} has {found} fields but the header has {expected}")]
    RaggedRow {
        row: usize,
        found: usize,
        expected: usize,
    },
    #[error("expected a top-level JSON array of objects")]
    NotRecords,
}

/// User-facing message for a failed load: remediation hints followed by the
/// error chain.
pub fn load_failure_message(err: &anyhow::Error) -> String {
    format!(
        "Couldn't read that file. Common fixes:\n\
         - If it's a spreadsheet, ensure it's .xlsx, .xls or .ods\n\
         - Make sure the first row has column headers\n\
         - Try another worksheet if using a workbook\n\
         - If dates are stored as text, that's OK; they will be parsed\n\
         \n\
         Error detail: {err:#}"
    )
}
