//! # Top Panel - File Selection and Playback Status
//!
//! Renders a single-row panel with the application title, the button that
//! opens the CSV file picker, and a summary of what is loaded and where
//! playback stands.

use crate::ui::AppState;
use eframe::egui;

/// Render the top panel.
///
/// # Parameters
///
/// * `ctx` - egui context
/// * `state` - Mutable application state (the open button triggers a file load)
pub fn render(ctx: &egui::Context, state: &mut AppState) {
    egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
        ui.add_space(4.0);
        ui.horizontal(|ui| {
            ui.heading("Location Radar");
            ui.separator();

            if ui.button("Open CSV…").clicked() {
                state.open_file_selector();
            }

            ui.separator();
            ui.label("File:");
            ui.label(egui::RichText::new(state.source_name.as_deref().unwrap_or("none")).strong());

            ui.separator();
            ui.label("Records:");
            ui.label(egui::RichText::new(state.sequence.len().to_string()).monospace().strong());

            ui.separator();
            ui.label("Status:");
            ui.label(egui::RichText::new(state.status_text()).monospace().strong());

            if let Some(record) = state.current_record() {
                ui.separator();
                ui.label(format!("#{} {} ({}, {})", record.id, record.name, record.latitude, record.longitude));
            }
        });
        ui.add_space(4.0);
    });
}
