use eframe::egui::{self, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Data table (lower half of the central panel)
// ---------------------------------------------------------------------------

/// Render the filtered rows, one column per dataset column.
pub fn data_table(ui: &mut Ui, state: &AppState) {
    let table = &state.view.table;

    ui.strong(format!("Data ({} rows)", table.len()));
    if table.columns.is_empty() {
        ui.label("The file has no columns.");
        return;
    }
    if table.is_empty() {
        ui.label(RichText::new("No rows match the current filters.").weak());
    }

    let color_map = state.color_map.as_ref();

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
        .columns(Column::auto().at_least(80.0), table.columns.len())
        .min_scrolled_height(0.0)
        .header(20.0, |mut header| {
            for col in &table.columns {
                header.col(|ui| {
                    ui.strong(col);
                });
            }
        })
        .body(|body| {
            body.rows(18.0, table.len(), |mut row| {
                let record = &table.rows[row.index()];
                for col in &table.columns {
                    row.col(|ui| {
                        let Some(value) = record.get(col) else {
                            return;
                        };
                        let mut text = RichText::new(value.to_string());
                        if let Some(cm) = color_map.filter(|cm| cm.column == *col) {
                            text = text.color(cm.color_for(value));
                        }
                        ui.label(text);
                    });
                }
            });
        });
}
