mod chart;
mod config;
mod loader;
mod model;
mod ui;
mod view;

use clap::Parser;
use config::Config;
use eframe::egui;
use loader::{spawn_fetch, HttpTrendSource};
use tracing_subscriber::EnvFilter;
use ui::TrendApp;
use view::Page;

fn main() -> anyhow::Result<()> {
    // Log to stderr, filtered with `RUST_LOG`
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::parse();
    let source = HttpTrendSource::new(&config.base_url, &config.endpoint)?;
    log::info!("category trends endpoint: {}", source.url());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.width, config.height])
            .with_min_inner_size([900.0, 600.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Seasonal Category Trends",
        options,
        Box::new(move |cc| {
            ui::set_custom_style(&cc.egui_ctx);

            // Containers exist before the fetch can render into them
            let page = Page::with_season_containers();
            let ctx = cc.egui_ctx.clone();
            let pending = spawn_fetch(source, move || ctx.request_repaint());

            Ok(Box::new(TrendApp::new(page, pending)))
        }),
    )
    .map_err(|e| anyhow::anyhow!("window failed: {e}"))
}
