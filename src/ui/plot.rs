use eframe::egui::{Color32, RichText, Ui};
use egui_plot::{Legend, Line, Plot, PlotPoints, PlotUi, Points};

use crate::data::model::YearValue;
use crate::data::views::{
    ExplorerView, LeadersView, SceneView, SizeLegend, tooltip_label, value_max,
};
use crate::state::{AppState, LoadState};

const GLOBAL_SERIES: &str = "Global average";
const MIN_BUBBLE: f32 = 3.0;
const MAX_BUBBLE: f32 = 15.0;

// ---------------------------------------------------------------------------
// Scene plot (central panel)
// ---------------------------------------------------------------------------

/// Render the active scene, or the fallback message when there is nothing
/// to draw.
pub fn scene_plot(ui: &mut Ui, state: &AppState) {
    let view = match (&state.load, &state.view) {
        (_, Some(Ok(view))) => view,
        (_, Some(Err(e))) => return fallback(ui, &e.to_string()),
        (LoadState::Failed(msg), None) => {
            return fallback(ui, &format!("Could not load data: {msg}"));
        }
        _ => return fallback(ui, "Open a CO₂ table to begin  (File → Open…)"),
    };

    if let Some(caption) = view.annotation() {
        ui.label(RichText::new(caption).italics());
    }

    match view {
        SceneView::Empty(reason) => fallback(ui, reason.message()),
        SceneView::GlobalAverage(points) => global_plot(ui, points),
        SceneView::LeadingEmitters(leaders) => {
            leaders_plot(ui, state, leaders, state.config.show_size_legend)
        }
        SceneView::CountryExplorer(explorer) => explorer_plot(ui, state, explorer),
    }
}

fn fallback(ui: &mut Ui, message: &str) {
    ui.centered_and_justified(|ui: &mut Ui| {
        ui.heading(message);
    });
}

fn base_plot(id: &str, y_max: Option<f64>) -> Plot<'static> {
    Plot::new(id.to_string())
        .legend(Legend::default())
        .x_axis_label("Year")
        .y_axis_label("t CO₂ per person")
        .include_y(0.0)
        .include_y(y_max.unwrap_or(1.0))
        .label_formatter(|name, value| {
            if name.is_empty() {
                String::new()
            } else {
                tooltip_label(name, value.x.round() as i32, value.y)
            }
        })
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
}

fn to_plot_points(points: &[YearValue]) -> PlotPoints<'static> {
    points
        .iter()
        .map(|p| [p.year as f64, p.value])
        .collect()
}

fn global_plot(ui: &mut Ui, points: &[YearValue]) {
    base_plot("global_average", value_max([points])).show(ui, |plot_ui: &mut PlotUi| {
        plot_ui.line(
            Line::new(to_plot_points(points))
                .name(GLOBAL_SERIES)
                .color(Color32::LIGHT_BLUE)
                .width(2.0),
        );
    });
}

fn leaders_plot(ui: &mut Ui, state: &AppState, view: &LeadersView, bubbles: bool) {
    let y_max = value_max(view.leaders.iter().map(|l| l.points.as_slice()));

    base_plot("leading_emitters", y_max).show(ui, |plot_ui: &mut PlotUi| {
        for leader in &view.leaders {
            let color = state.colors.color_for(&leader.country);
            plot_ui.line(
                Line::new(to_plot_points(&leader.points))
                    .name(&leader.country)
                    .color(color)
                    .width(1.5),
            );
            if bubbles {
                plot_ui.points(
                    Points::new(vec![[view.year as f64, leader.latest]])
                        .name(&leader.country)
                        .color(color)
                        .radius(bubble_radius(leader.latest, &view.legend)),
                );
            }
        }
    });

    if bubbles {
        let l = &view.legend;
        ui.label(format!(
            "Bubble size ({}): min {:.2}, median {:.2}, max {:.2} t per person",
            view.year, l.min, l.median, l.max
        ));
    }
}

fn explorer_plot(ui: &mut Ui, state: &AppState, view: &ExplorerView) {
    let (from, to) = view.year_extent();
    let points = view.points();
    let color = state.colors.color_for(view.country());

    base_plot("country_explorer", value_max([points]))
        .include_x(from as f64)
        .include_x(to as f64)
        .show(ui, |plot_ui: &mut PlotUi| {
            if points.is_empty() {
                return;
            }
            plot_ui.line(
                Line::new(to_plot_points(points))
                    .name(view.country())
                    .color(color)
                    .width(2.0),
            );
            plot_ui.points(
                Points::new(to_plot_points(points))
                    .name(view.country())
                    .color(color)
                    .radius(3.0),
            );
        });
}

/// Bubble radius with area proportional to the value's position between
/// the legend's min and max.
fn bubble_radius(value: f64, legend: &SizeLegend) -> f32 {
    let span = legend.max - legend.min;
    if span <= f64::EPSILON {
        return (MIN_BUBBLE + MAX_BUBBLE) / 2.0;
    }
    let t = ((value - legend.min) / span).clamp(0.0, 1.0).sqrt() as f32;
    MIN_BUBBLE + t * (MAX_BUBBLE - MIN_BUBBLE)
}
