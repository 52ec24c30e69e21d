//! Minimal window: a heading and a button.

use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([320.0, 160.0]),
        ..Default::default()
    };

    let mut clicks: u32 = 0;
    eframe::run_simple_native("Hello BMS", options, move |ctx, _frame| {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Hello BMS!");
            if ui.button("Click me").clicked() {
                clicks += 1;
                log::info!("button clicked {clicks} times");
            }
        });
    })
}
