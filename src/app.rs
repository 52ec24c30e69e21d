use eframe::egui;

use bms_dash::ViewEngine;

use crate::state::AppState;
use crate::ui::{panels, plot, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct BmsDashApp {
    pub state: AppState,
}

impl BmsDashApp {
    pub fn new(engine: ViewEngine) -> Self {
        Self {
            state: AppState::new(engine),
        }
    }
}

impl eframe::App for BmsDashApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Upload by drag-and-drop ----
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        if let Some(file) = dropped.first() {
            panels::load_dropped(&mut self.state, file);
        }

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: charts above, table below ----
        egui::CentralPanel::default().show(ctx, |ui| {
            if self.state.dataset.is_none() {
                ui.centered_and_justified(|ui| {
                    ui.heading("Open a BMS log to start  (File → Open…, or drop a file)");
                });
                return;
            }
            let chart_height = (ui.available_height() * 0.45).max(160.0);
            plot::charts(ui, &self.state, chart_height);
            ui.separator();
            table::data_table(ui, &self.state);
        });
    }
}
