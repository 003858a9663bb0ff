//! Opioid Atlas - Overdose, Prescription & Unemployment Dashboard
//!
//! A choropleth of opioid overdose deaths across US states, cross-filtered
//! with a death trend chart and an unemployment chart.

mod charts;
mod config;
mod dashboard;
mod data;
mod filter;
mod gui;
mod stats;

use anyhow::Context;
use config::DashboardConfig;
use dashboard::Dashboard;
use data::{spawn_loads, DataLoader, LocationSource};
use eframe::egui;
use gui::DashboardApp;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> anyhow::Result<()> {
    let (config, config_path) =
        DashboardConfig::load_default().context("Failed to load configuration")?;

    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    match &config_path {
        Some(path) => info!(path = %path.display(), "Loaded configuration"),
        None => info!("No config file found, using defaults"),
    }

    let source = LocationSource::new(&config.http).context("Failed to build HTTP client")?;
    let loader = DataLoader::new(Arc::new(source));
    info!(
        deaths = %config.sources.deaths,
        unemployment = %config.sources.unemployment,
        boundaries = %config.sources.boundaries,
        "Starting dataset loads"
    );
    let load_rx = spawn_loads(loader, &config.sources);

    let dashboard = Dashboard::new(config.map.width, config.map.height);

    // Configure native options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([1000.0, 700.0])
            .with_title("Opioid Atlas"),
        ..Default::default()
    };

    eframe::run_native(
        "Opioid Atlas",
        options,
        Box::new(|cc| Ok(Box::new(DashboardApp::new(cc, dashboard, load_rx)))),
    )
    .map_err(|e| anyhow::anyhow!("Failed to start the window: {}", e))
}
