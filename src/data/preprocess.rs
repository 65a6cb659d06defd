use super::dates::coerce_date;
use super::model::{CellValue, StoryTable};
use super::schema::{detect_schema, Role, Schema};

/// A loaded table paired with the schema inferred for it.
#[derive(Debug, Clone)]
pub struct Prepared {
    pub table: StoryTable,
    pub schema: Schema,
    /// Rows removed because their date could not be parsed.
    pub dropped_rows: usize,
}

/// Standardize column names, infer the schema and coerce role columns.
///
/// The date column (if any) becomes [`CellValue::Date`] and rows without a
/// parseable date are removed. Every other mapped role column becomes text,
/// with missing values as the empty string.
pub fn prepare(raw: StoryTable) -> Prepared {
    let mut table = raw.standardize_columns();
    let schema = detect_schema(&table.columns);
    let before = table.len();
    let date_idx = schema.date.as_deref().and_then(|c| table.column_index(c));

    if let Some(idx) = date_idx {
        table.stories.retain_mut(|story| match coerce_date(story.cell(idx)) {
            Some(dt) => {
                if let Some(cell) = story.cells.get_mut(idx) {
                    *cell = CellValue::Date(dt);
                }
                true
            }
            None => false,
        });
    }
    let dropped_rows = before - table.len();
    if dropped_rows > 0 {
        log::warn!("dropped {dropped_rows} of {before} rows with unparseable dates");
    }

    let text_columns = text_role_columns(&table.columns, &schema);

    let width = table.columns.len();
    for story in &mut table.stories {
        story.cells.resize(width, CellValue::Null);
        for &idx in &text_columns {
            let text = story.cells[idx].to_text();
            story.cells[idx] = CellValue::String(text);
        }
    }

    Prepared {
        table,
        schema,
        dropped_rows,
    }
}

/// Positions of the mapped role columns other than the date, which are
/// treated as text.
pub fn text_role_columns(columns: &[String], schema: &Schema) -> Vec<usize> {
    let date_idx = schema
        .date
        .as_deref()
        .and_then(|c| columns.iter().position(|col| col == c));
    Role::ALL
        .into_iter()
        .filter(|role| *role != Role::Date)
        .filter_map(|role| schema.column(role))
        .filter_map(|col| columns.iter().position(|c| c == col))
        .filter(|&idx| Some(idx) != date_idx)
        .collect()
}
