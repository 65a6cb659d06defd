use eframe::egui::{self, RichText, ScrollArea, Ui};

use crate::color::TagPalette;
use crate::data::filter::split_tags;
use crate::data::model::{CellValue, Story, StoryTable};
use crate::data::schema::{Role, Schema};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Story cards (central panel)
// ---------------------------------------------------------------------------

/// Column positions of the mapped roles.
struct RoleColumns {
    date: Option<usize>,
    title: Option<usize>,
    intro: Option<usize>,
    tags: Option<usize>,
    key_information: Option<usize>,
    relevance: Option<usize>,
    links: Option<usize>,
}

impl RoleColumns {
    fn resolve(table: &StoryTable, schema: &Schema) -> Self {
        let col = |role: Role| schema.column(role).and_then(|c| table.column_index(c));
        RoleColumns {
            date: col(Role::Date),
            title: col(Role::Title),
            intro: col(Role::Intro),
            tags: col(Role::Tags),
            key_information: col(Role::KeyInformation),
            relevance: col(Role::Relevance),
            links: col(Role::Links),
        }
    }

    fn has_details(&self) -> bool {
        self.key_information.is_some() || self.relevance.is_some() || self.links.is_some()
    }
}

/// First whitespace-separated token of a links cell.
pub fn first_link(raw: &str) -> Option<&str> {
    raw.split_whitespace().next()
}

/// Calendar date shown on a card; falls back to the raw text.
pub fn display_date(cell: &CellValue) -> String {
    match cell.as_date() {
        Some(dt) => dt.format("%Y-%m-%d").to_string(),
        None => cell.to_text(),
    }
}

/// Render the filtered stories as cards in the central panel.
pub fn story_cards(ui: &mut Ui, state: &AppState) {
    let session = match &state.session {
        Some(s) => s,
        None => {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading("Load data to begin  (File → Open… or File → Load sample data)");
            });
            return;
        }
    };

    let roles = RoleColumns::resolve(&session.table, &session.schema);

    if let Some(summary) = state.summary() {
        ui.label(RichText::new(summary).weak());
    }
    ui.add_space(4.0);

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for &idx in &state.visible_indices {
                let Some(story) = session.table.stories.get(idx) else {
                    continue;
                };
                story_card(ui, idx, story, &roles, &session.tag_palette);
                ui.add_space(6.0);
            }
        });
}

fn story_card(ui: &mut Ui, idx: usize, story: &Story, roles: &RoleColumns, palette: &TagPalette) {
    let text = |col: Option<usize>| col.map(|i| story.cell(i).to_text()).unwrap_or_default();

    let headline = match roles.title {
        Some(i) => story.cell(i).to_text(),
        None => "(No title)".to_string(),
    };
    let date = roles.date.map(|i| display_date(story.cell(i))).unwrap_or_default();
    let tags = split_tags(&text(roles.tags));
    let intro = text(roles.intro);
    let links = text(roles.links);

    egui::Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
        ui.set_width(ui.available_width());

        ui.horizontal(|ui: &mut Ui| {
            ui.heading(&headline);
            if let Some(url) = first_link(&links) {
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui: &mut Ui| {
                    ui.hyperlink_to("Open source", url);
                });
            }
        });

        // date • tags
        ui.horizontal_wrapped(|ui: &mut Ui| {
            if !date.is_empty() {
                ui.label(RichText::new(&date).small().weak());
            }
            if !date.is_empty() && !tags.is_empty() {
                ui.label(RichText::new("•").small().weak());
            }
            for tag in &tags {
                ui.label(RichText::new(tag).small().color(palette.color_for(tag)));
            }
        });

        if !intro.is_empty() {
            ui.label(&intro);
        }

        if roles.has_details() {
            egui::CollapsingHeader::new("View details")
                .id_salt(("story_details", idx))
                .show(ui, |ui: &mut Ui| {
                    if roles.key_information.is_some() {
                        ui.strong("Key information");
                        ui.label(text(roles.key_information));
                    }
                    if roles.relevance.is_some() {
                        ui.strong("Relevance");
                        ui.label(text(roles.relevance));
                    }
                    if roles.links.is_some() {
                        ui.strong("Links");
                        for link in links.split_whitespace() {
                            ui.hyperlink(link);
                        }
                    }
                });
        }
    });
}
