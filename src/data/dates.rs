use chrono::{DateTime, NaiveDate, NaiveDateTime};

use super::model::CellValue;

/// Date-time spellings tried in order.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Date-only spellings tried in order. Ambiguous slashed dates are read
/// month first.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d.%m.%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%d %B %Y",
    "%d %b %Y",
];

/// Parse a textual date or date-time. Returns `None` for anything else.
pub fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.naive_local());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Coerce a cell to a canonical date-time. Numbers are not dates.
pub fn coerce_date(cell: &CellValue) -> Option<NaiveDateTime> {
    match cell {
        CellValue::Date(d) => Some(*d),
        CellValue::String(s) => parse_datetime(s),
        _ => None,
    }
}
