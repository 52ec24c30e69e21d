use std::path::Path;

use eframe::egui::{self, Color32, RichText, Ui};
use egui_extras::DatePickerButton;

use bms_dash::data::loader::{self, SUPPORTED_EXTENSIONS};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel. Any edit recomputes the view once.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    if state.dataset.is_none() {
        ui.label("No dataset loaded.");
        return;
    }

    let mut changed = false;

    // ---- Battery id ----
    ui.strong("Battery ID");
    ui.horizontal(|ui: &mut Ui| {
        let edit = egui::TextEdit::singleline(&mut state.battery_input)
            .hint_text("all batteries")
            .desired_width(120.0);
        changed |= ui.add(edit).changed();
        if ui.small_button("Clear").clicked() {
            state.battery_input.clear();
            changed = true;
        }
    });

    let ids = state.battery_ids();
    egui::ComboBox::from_id_salt("battery_ids")
        .selected_text(format!("{} known", ids.len()))
        .show_ui(ui, |ui: &mut Ui| {
            for id in &ids {
                let color = state
                    .color_map
                    .as_ref()
                    .map(|cm| cm.color_for(&bms_dash::CellValue::Text(id.clone())))
                    .unwrap_or(Color32::GRAY);
                let selected = state.battery_input == *id;
                if ui
                    .selectable_label(selected, RichText::new(id).color(color))
                    .clicked()
                {
                    state.battery_input = id.clone();
                    changed = true;
                }
            }
        });
    ui.separator();

    // ---- Date range ----
    ui.strong("Date range");
    ui.horizontal(|ui: &mut Ui| {
        changed |= ui.checkbox(&mut state.start_enabled, "From").changed();
        ui.add_enabled_ui(state.start_enabled, |ui: &mut Ui| {
            changed |= ui
                .add(DatePickerButton::new(&mut state.start_date).id_salt("start_date"))
                .changed();
        });
    });
    ui.horizontal(|ui: &mut Ui| {
        changed |= ui.checkbox(&mut state.end_enabled, "To").changed();
        ui.add_enabled_ui(state.end_enabled, |ui: &mut Ui| {
            changed |= ui
                .add(DatePickerButton::new(&mut state.end_date).id_salt("end_date"))
                .changed();
        });
    });
    if state.start_enabled != state.end_enabled {
        ui.label(RichText::new("Set both dates to filter by date.").weak());
    }
    ui.separator();

    if ui.button("Reset filters").clicked() {
        state.reset_filters();
        return;
    }

    if changed {
        state.refresh();
    }
}

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
                "{}: {} rows loaded, {} shown",
                ds.name,
                ds.data.len(),
                state.view.table.len()
            ));
        } else {
            ui.label("Drop a file here or use File → Open…");
        }

        for msg in [&state.load_error, &state.filter_error].into_iter().flatten() {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Upload: file dialog and drag-and-drop
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open BMS log")
        .add_filter("Supported files", SUPPORTED_EXTENSIONS)
        .add_filter("Spreadsheet", &["xlsx", "xlsm", "xls", "ods"])
        .add_filter("CSV", &["csv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .add_filter("JSON", &["json"])
        .pick_file();

    if let Some(path) = file {
        load_path(state, &path);
    }
}

/// Load a file dropped onto the window.
pub fn load_dropped(state: &mut AppState, file: &egui::DroppedFile) {
    if let Some(path) = &file.path {
        load_path(state, path);
    } else if let Some(bytes) = &file.bytes {
        let result = loader::load_bytes(&file.name, bytes);
        finish_load(state, file.name.clone(), result);
    }
}

fn load_path(state: &mut AppState, path: &Path) {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let result = loader::load_file(path);
    finish_load(state, name, result);
}

fn finish_load(state: &mut AppState, name: String, result: anyhow::Result<bms_dash::Dataset>) {
    match result {
        Ok(dataset) => {
            log::info!(
                "Loaded {} rows from {name} with columns {:?}",
                dataset.len(),
                dataset.columns
            );
            state.set_dataset(name, dataset);
        }
        Err(e) => {
            log::error!("Failed to load {name}: {e:#}");
            state.set_load_error(format!("Error: {e:#}"));
        }
    }
}
