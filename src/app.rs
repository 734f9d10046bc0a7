use eframe::egui;

use crate::state::AppState;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct Co2StoryApp {
    pub state: AppState,
}

impl Co2StoryApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for Co2StoryApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Bottom panel: scene navigation ----
        egui::TopBottomPanel::bottom("navigation").show(ctx, |ui| {
            ui.add_space(4.0);
            panels::navigation_bar(ui, &mut self.state);
            ui.add_space(4.0);
        });

        // ---- Central panel: scene plot ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::scene_plot(ui, &self.state);
        });
    }
}
