use std::collections::BTreeSet;

use chrono::NaiveDate;

use super::model::{Story, StoryTable};
use super::schema::{Role, Schema};

// ---------------------------------------------------------------------------
// Filter criteria: what the user picked in the side panel
// ---------------------------------------------------------------------------

/// User-selected filters. Unset criteria impose no constraint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    /// Inclusive calendar-date range.
    pub date_range: Option<(NaiveDate, NaiveDate)>,
    /// Selected tags; matched case-insensitively, any one suffices.
    pub tags: BTreeSet<String>,
    /// Case-insensitive substring; empty disables search.
    pub search: String,
}

/// Split a raw tag cell on `;`, `|` and `,` into trimmed, non-empty tags.
pub fn split_tags(raw: &str) -> Vec<String> {
    raw.split([';', '|', ','])
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Resolve a role to the position of its column in `table`.
fn role_index(table: &StoryTable, schema: &Schema, role: Role) -> Option<usize> {
    schema.column(role).and_then(|c| table.column_index(c))
}

fn story_tags(story: &Story, tag_idx: usize) -> Vec<String> {
    split_tags(&story.cell(tag_idx).to_text())
}

/// All distinct tags across the full table, sorted.
pub fn tag_vocabulary(table: &StoryTable, schema: &Schema) -> BTreeSet<String> {
    let Some(tag_idx) = role_index(table, schema, Role::Tags) else {
        return BTreeSet::new();
    };
    table
        .stories
        .iter()
        .flat_map(|story| story_tags(story, tag_idx))
        .collect()
}

/// Earliest and latest calendar dates of the date column.
pub fn date_span(table: &StoryTable, schema: &Schema) -> Option<(NaiveDate, NaiveDate)> {
    let idx = role_index(table, schema, Role::Date)?;
    let dates = table
        .stories
        .iter()
        .filter_map(|story| story.cell(idx).as_date())
        .map(|dt| dt.date());
    dates.fold(None, |span, d| match span {
        None => Some((d, d)),
        Some((lo, hi)) => Some((lo.min(d), hi.max(d))),
    })
}

/// Return indices of stories that pass all active filters, newest first when
/// the table has a date column (ties keep load order), load order otherwise.
///
/// Stages run in order: date range, tags, keyword search, sort.
pub fn filtered_indices(table: &StoryTable, schema: &Schema, criteria: &FilterCriteria) -> Vec<usize> {
    let date_idx = role_index(table, schema, Role::Date);
    let tag_idx = role_index(table, schema, Role::Tags);

    let wanted_tags: BTreeSet<String> = criteria.tags.iter().map(|t| t.to_lowercase()).collect();
    let query = criteria.search.to_lowercase();
    let search_cols: Vec<usize> = [Role::Title, Role::Intro, Role::KeyInformation, Role::Relevance]
        .into_iter()
        .filter_map(|role| role_index(table, schema, role))
        .collect();

    let mut indices: Vec<usize> = table
        .stories
        .iter()
        .enumerate()
        .filter(|(_, story)| {
            if let (Some(idx), Some((start, end))) = (date_idx, criteria.date_range) {
                match story.cell(idx).as_date() {
                    Some(dt) if (start..=end).contains(&dt.date()) => {}
                    _ => return false,
                }
            }
            if let (Some(idx), false) = (tag_idx, wanted_tags.is_empty()) {
                let matched = story_tags(story, idx)
                    .iter()
                    .any(|t| wanted_tags.contains(&t.to_lowercase()));
                if !matched {
                    return false;
                }
            }
            if !query.is_empty() {
                let hit = search_cols
                    .iter()
                    .any(|&c| story.cell(c).to_text().to_lowercase().contains(&query));
                if !hit {
                    return false;
                }
            }
            true
        })
        .map(|(i, _)| i)
        .collect();

    if let Some(idx) = date_idx {
        // Vec::sort_by_key is stable.
        indices.sort_by_key(|&i| std::cmp::Reverse(table.stories[i].cell(idx).as_date()));
    }
    indices
}

/// The filtered, sorted view as a table of its own.
pub fn apply_filters(table: &StoryTable, schema: &Schema, criteria: &FilterCriteria) -> StoryTable {
    table.subset(&filtered_indices(table, schema, criteria))
}
