use eframe::egui;

use crate::state::AppState;
use crate::ui::{cards, panels};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct NewsDashboardApp {
    pub state: AppState,
}

impl eframe::App for NewsDashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Bottom panel: status / errors ----
        if self.state.status_message.is_some() {
            egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
                panels::status_bar(ui, &mut self.state);
            });
        }

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: story cards ----
        egui::CentralPanel::default().show(ctx, |ui| {
            cards::story_cards(ui, &self.state);
        });
    }
}
