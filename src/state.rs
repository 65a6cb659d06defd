use std::collections::BTreeSet;
use std::path::Path;

use chrono::NaiveDate;

use crate::color::TagPalette;
use crate::data::error::load_failure_message;
use crate::data::export::save_csv;
use crate::data::filter::{date_span, filtered_indices, tag_vocabulary, FilterCriteria};
use crate::data::loader::{self, Source};
use crate::data::model::StoryTable;
use crate::data::preprocess::prepare;
use crate::data::schema::Schema;

// ---------------------------------------------------------------------------
// Session: one loaded table and everything derived from it
// ---------------------------------------------------------------------------

/// A loaded table together with its schema. Always replaced as a whole so the
/// schema never refers to columns of another table.
#[derive(Debug, Clone)]
pub struct Session {
    pub table: StoryTable,
    pub schema: Schema,
    pub source: Source,
    /// Every tag in the full table; never narrowed by filtering.
    pub vocabulary: BTreeSet<String>,
    pub tag_palette: TagPalette,
    /// Earliest and latest story date, when the table has a date column.
    pub date_span: Option<(NaiveDate, NaiveDate)>,
    pub dropped_rows: usize,
}

impl Session {
    pub fn new(raw: StoryTable, source: Source) -> Self {
        let prepared = prepare(raw);
        let vocabulary = tag_vocabulary(&prepared.table, &prepared.schema);
        let tag_palette = TagPalette::new(&vocabulary);
        let date_span = date_span(&prepared.table, &prepared.schema);
        Session {
            table: prepared.table,
            schema: prepared.schema,
            source,
            vocabulary,
            tag_palette,
            date_span,
            dropped_rows: prepared.dropped_rows,
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum StatusMessage {
    Info(String),
    Error(String),
}

/// The full UI state, independent of rendering.
#[derive(Default)]
pub struct AppState {
    /// Loaded session (None until the user loads data).
    pub session: Option<Session>,

    /// Current filter selections.
    pub criteria: FilterCriteria,

    /// Indices of stories passing the current filters, in display order (cached).
    pub visible_indices: Vec<usize>,

    /// Status / error message shown in the UI.
    pub status_message: Option<StatusMessage>,
}

impl AppState {
    /// Install a freshly loaded session and reset the filters to show everything.
    pub fn set_session(&mut self, session: Session) {
        log::info!(
            "Loaded {} stories with columns {:?} ({} dropped for bad dates)",
            session.table.len(),
            session.table.columns,
            session.dropped_rows
        );
        match serde_json::to_string(&session.schema) {
            Ok(json) => log::info!("Detected schema: {json}"),
            Err(e) => log::warn!("Could not serialize schema: {e}"),
        }

        self.criteria = FilterCriteria {
            date_range: session.date_span,
            ..Default::default()
        };
        self.status_message = Some(StatusMessage::Info(session.source.loaded_message()));
        self.session = Some(session);
        self.refilter();
    }

    fn report_load_error(&mut self, err: anyhow::Error) {
        log::error!("Failed to load data: {err:#}");
        self.status_message = Some(StatusMessage::Error(load_failure_message(&err)));
    }

    /// Load a file. On failure the current session is kept.
    pub fn load_path(&mut self, path: &Path) {
        match loader::load_file(path) {
            Ok((table, source)) => self.set_session(Session::new(table, source)),
            Err(e) => self.report_load_error(e),
        }
    }

    /// Load the bundled sample dataset.
    pub fn load_sample(&mut self) {
        match loader::load_sample() {
            Ok(table) => self.set_session(Session::new(table, Source::Sample)),
            Err(e) => self.report_load_error(e),
        }
    }

    /// Switch to another worksheet of the currently loaded workbook.
    pub fn select_sheet(&mut self, sheet: &str) {
        let Some(Source::Workbook { path, sheets, .. }) =
            self.session.as_ref().map(|s| s.source.clone())
        else {
            return;
        };
        match loader::load_sheet(&path, sheet) {
            Ok(table) => {
                let source = Source::Workbook {
                    path,
                    sheet: sheet.to_string(),
                    sheets,
                };
                self.set_session(Session::new(table, source));
            }
            Err(e) => self.report_load_error(e),
        }
    }

    /// Recompute `visible_indices` after a filter change.
    pub fn refilter(&mut self) {
        self.visible_indices = match &self.session {
            Some(s) => filtered_indices(&s.table, &s.schema, &self.criteria),
            None => Vec::new(),
        };
    }

    /// Set the date filter, clamped to the loaded table's date span.
    pub fn set_date_range(&mut self, start: NaiveDate, end: NaiveDate) {
        let span = self.session.as_ref().and_then(|s| s.date_span);
        self.criteria.date_range = Some(match span {
            Some((lo, hi)) => (start.clamp(lo, hi), end.clamp(lo, hi)),
            None => (start, end),
        });
        self.refilter();
    }

    /// Toggle a single tag in the selection.
    pub fn toggle_tag(&mut self, tag: &str) {
        if !self.criteria.tags.remove(tag) {
            self.criteria.tags.insert(tag.to_string());
        }
        self.refilter();
    }

    /// Deselect all tags.
    pub fn clear_tags(&mut self) {
        self.criteria.tags.clear();
        self.refilter();
    }

    pub fn set_search(&mut self, query: &str) {
        self.criteria.search = query.to_string();
        self.refilter();
    }

    /// The rows currently shown, as a table in display order.
    pub fn filtered_table(&self) -> Option<StoryTable> {
        self.session
            .as_ref()
            .map(|s| s.table.subset(&self.visible_indices))
    }

    /// `Showing N of M stories.`
    pub fn summary(&self) -> Option<String> {
        self.session.as_ref().map(|s| {
            format!(
                "Showing {} of {} stories.",
                self.visible_indices.len(),
                s.table.len()
            )
        })
    }

    /// Write the filtered view to `path` as CSV. The outcome goes to the
    /// status bar.
    pub fn export_to(&mut self, path: &Path) {
        let Some(table) = self.filtered_table() else {
            return;
        };
        self.status_message = Some(match save_csv(&table, path) {
            Ok(()) => {
                log::info!("Exported {} stories to {}", table.len(), path.display());
                StatusMessage::Info(format!("Saved {}", path.display()))
            }
            Err(e) => {
                log::error!("Export failed: {e:#}");
                StatusMessage::Error(format!("Export failed: {e:#}"))
            }
        });
    }
}
