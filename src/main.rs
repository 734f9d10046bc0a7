mod app;
mod color;
mod config;
mod data;
mod scene;
mod state;
mod ui;

use std::path::PathBuf;

use anyhow::Result;
use app::Co2StoryApp;
use clap::Parser;
use config::{Preset, StoryConfig};
use eframe::egui;
use state::AppState;

#[derive(Parser, Debug)]
#[command(name = "co2-story", version, about)]
struct Cli {
    /// CO₂ per-capita table to open on start (.csv, .json or .parquet).
    #[arg(long)]
    data: Option<PathBuf>,

    /// JSON file overriding scene-selection settings.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Built-in settings used when no config file is given.
    #[arg(long, value_enum, default_value_t = Preset::Simple)]
    preset: Preset,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => StoryConfig::load(path)?,
        None => StoryConfig::from_preset(cli.preset),
    };
    log::debug!("Story config: {config:?}");

    let mut state = AppState::new(config);
    if let Some(path) = &cli.data {
        ui::panels::load_into(&mut state, path);
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 700.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "CO₂ Story – Per-capita Emissions",
        options,
        Box::new(|_cc| Ok(Box::new(Co2StoryApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("running viewer: {e}"))
}
