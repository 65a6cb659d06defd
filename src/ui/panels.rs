use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::DatePickerButton;

use crate::data::export::DEFAULT_EXPORT_NAME;
use crate::data::loader::Source;
use crate::state::{AppState, StatusMessage};

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let session = match &state.session {
        Some(s) => s,
        None => {
            ui.label("Load data to begin.");
            return;
        }
    };

    // Clone what we need so we can mutate state below.
    let has_date = session.schema.date.is_some();
    let date_span = session.date_span;
    let has_tags = session.schema.tags.is_some();
    let vocabulary: Vec<String> = session.vocabulary.iter().cloned().collect();
    let palette = session.tag_palette.clone();
    let workbook = match &session.source {
        Source::Workbook { sheet, sheets, .. } => Some((sheet.clone(), sheets.clone())),
        _ => None,
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Worksheet selector ----
            if let Some((current, sheets)) = workbook {
                ui.strong("Worksheet");
                let mut picked: Option<String> = None;
                egui::ComboBox::from_id_salt("sheet_select")
                    .selected_text(&current)
                    .show_ui(ui, |ui: &mut Ui| {
                        for name in &sheets {
                            if ui.selectable_label(*name == current, name).clicked() {
                                picked = Some(name.clone());
                            }
                        }
                    });
                if let Some(name) = picked.filter(|n| *n != current) {
                    state.select_sheet(&name);
                }
                ui.separator();
            }

            // ---- Date range ----
            if has_date {
                ui.strong("Date range");
                match (date_span, state.criteria.date_range) {
                    (Some((lo, hi)), Some((mut start, mut end))) => {
                        let mut changed = false;
                        ui.horizontal(|ui: &mut Ui| {
                            ui.label("From");
                            changed |= ui
                                .add(DatePickerButton::new(&mut start).id_salt("date_start"))
                                .changed();
                        });
                        ui.horizontal(|ui: &mut Ui| {
                            ui.label("To");
                            changed |= ui
                                .add(DatePickerButton::new(&mut end).id_salt("date_end"))
                                .changed();
                        });
                        // Picks outside the table's span are clamped back into it.
                        if changed {
                            state.set_date_range(start, end);
                        }
                        if ui.small_button("Reset").clicked() {
                            state.set_date_range(lo, hi);
                        }
                    }
                    _ => {
                        ui.label(
                            RichText::new(
                                "No valid dates detected in the date column. Date filter disabled.",
                            )
                            .weak(),
                        );
                    }
                }
                ui.separator();
            }

            // ---- Tags ----
            if has_tags {
                let header_text = format!(
                    "Topics / Tags  ({}/{})",
                    state.criteria.tags.len(),
                    vocabulary.len()
                );
                egui::CollapsingHeader::new(RichText::new(header_text).strong())
                    .id_salt("tag_filter")
                    .default_open(true)
                    .show(ui, |ui: &mut Ui| {
                        if ui.small_button("Clear").clicked() {
                            state.clear_tags();
                        }
                        for tag in &vocabulary {
                            let mut checked = state.criteria.tags.contains(tag);
                            let text = RichText::new(tag).color(palette.color_for(tag));
                            if ui.checkbox(&mut checked, text).changed() {
                                state.toggle_tag(tag);
                            }
                        }
                    });
                ui.separator();
            }

            // ---- Keyword search ----
            ui.strong("Search keywords");
            let mut query = state.criteria.search.clone();
            if ui.text_edit_singleline(&mut query).changed() {
                state.set_search(&query);
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Load sample data").clicked() {
                state.load_sample();
                ui.close_menu();
            }
            ui.separator();
            let can_export = state.session.is_some();
            if ui
                .add_enabled(can_export, egui::Button::new("Download filtered results (CSV)…"))
                .clicked()
            {
                export_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(summary) = state.summary() {
            ui.label(summary);
        }
    });
}

// ---------------------------------------------------------------------------
// Status bar
// ---------------------------------------------------------------------------

pub fn status_bar(ui: &mut Ui, state: &mut AppState) {
    let mut dismiss = false;
    ui.horizontal(|ui: &mut Ui| {
        match &state.status_message {
            Some(StatusMessage::Info(msg)) => {
                ui.label(RichText::new(msg).color(Color32::from_rgb(60, 160, 90)));
            }
            Some(StatusMessage::Error(msg)) => {
                ui.label(RichText::new(msg).color(Color32::RED));
            }
            None => {}
        }
        if ui.small_button("✕").clicked() {
            dismiss = true;
        }
    });
    if dismiss {
        state.status_message = None;
    }
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open stories")
        .add_filter(
            "Supported files",
            &["csv", "xlsx", "xlsm", "xls", "ods", "json", "parquet", "pq"],
        )
        .add_filter("CSV", &["csv"])
        .add_filter("Spreadsheet", &["xlsx", "xlsm", "xls", "ods"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.load_path(&path);
    }
}

pub fn export_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Download filtered results")
        .add_filter("CSV", &["csv"])
        .set_file_name(DEFAULT_EXPORT_NAME)
        .save_file();

    if let Some(path) = file {
        state.export_to(&path);
    }
}
