//! # Records Table
//!
//! Right-hand panel listing every parsed record in file order. The current
//! record is highlighted and scrolled into view whenever playback moves.
//!
//! Uses `egui_extras::TableBuilder` so only visible rows are laid out.

use crate::ui::AppState;
use eframe::egui;

/// Render the records table panel.
pub fn render(ctx: &egui::Context, state: &mut AppState) {
    egui::SidePanel::right("records_table")
        .resizable(true)
        .default_width(state.table_width)
        .show(ctx, |ui| {
            ui.heading("Records");
            ui.separator();

            if state.sequence.is_empty() {
                ui.centered_and_justified(|ui| {
                    ui.label(egui::RichText::new("No records loaded").italics());
                });
                return;
            }

            render_records_table(ui, state);
        });
}

fn render_records_table(ui: &mut egui::Ui, state: &mut AppState) {
    use egui_extras::{Column, TableBuilder};

    let row_height = ui.text_style_height(&egui::TextStyle::Body) * 1.3;

    let mut table = TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .vscroll(true)
        .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
        .column(Column::initial(50.0).at_least(30.0)) // ID
        .column(Column::initial(80.0).at_least(40.0)) // Route
        .column(Column::initial(90.0).at_least(40.0)) // Date
        .column(Column::initial(80.0).at_least(40.0)) // Latitude
        .column(Column::initial(80.0).at_least(40.0)) // Longitude
        .column(Column::remainder()); // Name

    if state.scroll_to_current {
        if let Some(current) = state.current_index {
            table = table.scroll_to_row(current, Some(egui::Align::Center));
        }
        state.scroll_to_current = false;
    }

    let current = state.current_index;
    let records = state.sequence.records();

    table
        .header(row_height, |mut header| {
            for title in ["ID", "Route", "Date", "Latitude", "Longitude", "Name"] {
                header.col(|ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|body| {
            body.rows(row_height, records.len(), |mut row| {
                let index = row.index();
                let record = &records[index];
                row.set_selected(current == Some(index));

                row.col(|ui| {
                    ui.label(&record.id);
                });
                row.col(|ui| {
                    ui.label(&record.label);
                });
                row.col(|ui| {
                    ui.label(&record.date);
                });
                row.col(|ui| {
                    ui.monospace(record.latitude.to_string());
                });
                row.col(|ui| {
                    ui.monospace(record.longitude.to_string());
                });
                row.col(|ui| {
                    ui.label(&record.name);
                });
            });
        });
}
