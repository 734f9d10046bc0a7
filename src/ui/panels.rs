use std::path::Path;

use eframe::egui::{self, Color32, RichText, Ui};

use crate::scene::Scene;
use crate::state::AppState;

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
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} observations, {} countries",
                ds.len(),
                ds.real_countries().len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Story navigation
// ---------------------------------------------------------------------------

/// Prev / next buttons, the step indicator and, in the explorer scene, the
/// country dropdown.
pub fn navigation_bar(ui: &mut Ui, state: &mut AppState) {
    let current = state.story.scene();

    ui.horizontal(|ui: &mut Ui| {
        let has_data = state.dataset.is_some();

        if ui
            .add_enabled(has_data && current != Scene::GlobalAverage, egui::Button::new("◀ Prev"))
            .clicked()
        {
            state.previous_scene();
        }

        for scene in Scene::ALL {
            let text = RichText::new(scene.to_string());
            let text = if scene == current {
                text.strong().color(Color32::LIGHT_BLUE)
            } else {
                text.weak()
            };
            ui.label(text);
        }

        if ui
            .add_enabled(has_data && current != Scene::CountryExplorer, egui::Button::new("Next ▶"))
            .clicked()
        {
            state.next_scene();
        }

        if state.story.dropdown_visible() {
            ui.separator();
            country_dropdown(ui, state);
        }
    });
}

fn country_dropdown(ui: &mut Ui, state: &mut AppState) {
    let Some(ds) = &state.dataset else {
        return;
    };
    // Owned copy so the selection can mutate state inside the closure.
    let countries: Vec<String> = ds.real_countries().into_iter().map(String::from).collect();
    let selected = state.story.selected_country().unwrap_or_default().to_string();

    egui::ComboBox::from_id_salt("country")
        .selected_text(&selected)
        .width(200.0)
        .show_ui(ui, |ui: &mut Ui| {
            for country in &countries {
                if ui
                    .selectable_label(selected == *country, country)
                    .clicked()
                {
                    state.select_country(country);
                }
            }
        });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open CO₂ per-capita table")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        load_into(state, &path);
    }
}

/// One-shot load of a table into the state. No retries.
pub fn load_into(state: &mut AppState, path: &Path) {
    match crate::data::loader::load_file(path) {
        Ok(dataset) => state.set_dataset(dataset),
        Err(e) => state.set_load_error(format!("{e:#}")),
    }
}
