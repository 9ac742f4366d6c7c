mod app;
mod ui;

use app::RustyReportApp;
use eframe::egui;
use rusty_report::config::AppConfig;

fn main() -> eframe::Result {
    env_logger::init();

    let config = AppConfig::load().unwrap_or_else(|e| {
        log::error!("{e:#}; using default settings");
        AppConfig::default()
    });

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.window_width, config.window_height])
            .with_min_inner_size([700.0, 450.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Rusty Report – Course Reports",
        options,
        Box::new(|_cc| Ok(Box::new(RustyReportApp::new(config)))),
    )
}
