//! Desktop dashboard for browsing a table of news stories: load a CSV,
//! workbook, JSON or Parquet file, let the column roles be guessed from their
//! names, filter by date, tag and keyword, and export what is left as CSV.

pub mod app;
pub mod color;
pub mod data;
pub mod state;
pub mod ui;
