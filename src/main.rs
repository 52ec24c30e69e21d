mod app;
mod color;
mod state;
mod ui;

use app::BmsDashApp;
use bms_dash::config::DashConfig;
use bms_dash::ViewEngine;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let config = DashConfig::load();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(config.window_size)
            .with_min_inner_size([700.0, 450.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        "BMS Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(BmsDashApp::new(ViewEngine::new(config.columns))))),
    )
}
