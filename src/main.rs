mod app;
mod color;
mod config;
mod state;
mod ui;

use anyhow::Context;
use app::SalesDashboardApp;
use clap::Parser;
use config::{DashboardArgs, DashboardConfig};
use eframe::egui;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = DashboardArgs::parse();
    let config = DashboardConfig::try_from(args).context("invalid command line options")?;
    log::debug!("Starting with {config:?}");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 900.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Sales Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(SalesDashboardApp::new(config)))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}
