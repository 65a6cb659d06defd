/// Data layer: core types, loading, schema inference, filtering and export.
///
/// Architecture:
/// ```text
///  .csv / .xlsx / .json / .parquet / bundled sample
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → StoryTable
///   └──────────┘
///        │
///        ▼
///   ┌────────────┐
///   │ preprocess  │  trim columns, detect_schema, coerce dates/text
///   └────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  date range → tags → search → newest first
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  export   │  filtered view → CSV bytes
///   └──────────┘
/// ```

pub mod dates;
pub mod error;
pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
pub mod preprocess;
pub mod schema;
