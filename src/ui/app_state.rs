//! # Application State Management
//!
//! This module implements the central `AppState` struct which holds everything
//! the panels draw and implements `eframe::App`.
//!
//! ## Responsibilities
//!
//! - Processes incoming messages from the playback task via `ui_refresh_rx`
//! - Sends file-load and shutdown commands via `ui_command_tx`
//! - Coordinates rendering of the top bar, records table and map
//!
//! The playback task is the single source of truth for the current index;
//! the UI only mirrors what the events tell it.

use eframe::egui;
use std::path::PathBuf;

use super::{UICommand, UIRefreshState};
use crate::config::AppConfig;
use crate::location::{GeoBounds, LocationRecord, LocationSequence};
use crate::playback::{PlaybackEvent, PlaybackPhase};

/// Repaint interval so playback updates show up without user input.
const REPAINT_INTERVAL: std::time::Duration = std::time::Duration::from_millis(50);

pub struct AppState {
    /// Optional alert message to display in a modal dialog.
    pub alert: Option<String>,
    /// Receiver for UI refresh messages from the playback task.
    pub ui_refresh_rx: crate::UIRefreshQueueReceiver,
    /// Sender for commands from the UI to the playback task.
    pub ui_command_tx: crate::UICommandQueueSender,

    /// File name of the loaded sequence.
    pub source_name: Option<String>,
    pub sequence: LocationSequence,
    /// Bounds of `sequence`, cached for the map.
    pub bounds: Option<GeoBounds>,
    pub current_index: Option<usize>,
    pub phase: PlaybackPhase,
    /// Set when the current index moves so the table scrolls to it once.
    pub scroll_to_current: bool,

    /// Text drawn next to the position marker.
    pub marker_label: String,
    /// Initial width of the table panel.
    pub table_width: f32,
    /// Last directory used by the file picker (current session only).
    pub last_open_dir: Option<PathBuf>,
}

impl AppState {
    /// Create a new AppState.
    ///
    /// # Parameters
    ///
    /// * `rx` - Receiver for UI refresh messages from the playback task
    /// * `tx` - Sender for commands to the playback task
    /// * `config` - Display settings
    pub fn new(rx: crate::UIRefreshQueueReceiver, tx: crate::UICommandQueueSender, config: &AppConfig) -> Self {
        Self {
            alert: None,
            ui_refresh_rx: rx,
            ui_command_tx: tx,
            source_name: None,
            sequence: LocationSequence::default(),
            bounds: None,
            current_index: None,
            phase: PlaybackPhase::Idle,
            scroll_to_current: false,
            marker_label: config.marker_label.clone(),
            table_width: config.table_width,
            last_open_dir: None,
        }
    }

    /// Open the native file picker for CSV files and ask the playback task to load the selection.
    ///
    /// Cancelling the picker changes nothing.
    pub fn open_file_selector(&mut self) {
        let mut dialog = rfd::FileDialog::new().add_filter("CSV files", &["csv"]);
        if let Some(dir) = &self.last_open_dir {
            dialog = dialog.set_directory(dir);
        }
        let Some(files) = dialog.pick_files() else {
            return;
        };
        if files.is_empty() {
            return;
        }
        if let Some(parent) = files[0].parent() {
            self.last_open_dir = Some(parent.to_path_buf());
        }
        if self.ui_command_tx.try_send(UICommand::LoadFiles(files)).is_err() {
            log::warn!("Command queue full, file load request dropped");
        }
    }

    /// Apply one message from the playback task.
    pub fn apply_refresh(&mut self, msg: UIRefreshState) {
        match msg {
            UIRefreshState::Alert(alert_msg) => {
                self.alert = Some(alert_msg);
            }
            UIRefreshState::SequenceLoaded { source, sequence } => {
                self.bounds = sequence.bounds();
                self.sequence = sequence;
                self.source_name = Some(source);
                self.current_index = None;
                self.phase = PlaybackPhase::Idle;
                self.scroll_to_current = false;
            }
            UIRefreshState::Playback(event) => match event {
                PlaybackEvent::Started { index, .. } => {
                    self.current_index = Some(index);
                    self.phase = PlaybackPhase::Playing;
                    self.scroll_to_current = true;
                }
                PlaybackEvent::Advanced { index, .. } => {
                    self.current_index = Some(index);
                    self.scroll_to_current = true;
                }
                PlaybackEvent::Finished { index } => {
                    self.current_index = Some(index);
                    self.phase = PlaybackPhase::Finished;
                }
            },
        }
    }

    pub fn current_record(&self) -> Option<&LocationRecord> {
        self.current_index.and_then(|i| self.sequence.get(i))
    }

    /// Records visited so far, the current one included.
    pub fn trail(&self) -> &[LocationRecord] {
        match self.current_index {
            Some(i) if i < self.sequence.len() => &self.sequence.records()[..=i],
            _ => &[],
        }
    }

    /// One-line playback status for the top panel.
    pub fn status_text(&self) -> String {
        let total = self.sequence.len();
        match (self.phase, self.current_index) {
            (PlaybackPhase::Playing, Some(i)) => format!("Playing {}/{}", i + 1, total),
            (PlaybackPhase::Finished, Some(i)) => format!("Finished {}/{}", i + 1, total),
            _ => "Idle".to_string(),
        }
    }
}

impl Drop for AppState {
    fn drop(&mut self) {
        // Cancel the playback ticker before the process goes away
        let _ = self.ui_command_tx.try_send(UICommand::Shutdown);
    }
}

impl eframe::App for AppState {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Repaint periodically so background updates are visible without input
        ctx.request_repaint_after(REPAINT_INTERVAL);

        while let Ok(msg) = self.ui_refresh_rx.try_receive() {
            self.apply_refresh(msg);
        }

        if let Some(alert_msg) = self.alert.clone() {
            egui::Window::new("Alert")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
                .show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(20.0);
                        ui.label(alert_msg);
                        ui.add_space(20.0);

                        if ui.button("OK").clicked() {
                            self.alert = None;
                        }
                        ui.add_space(10.0);
                    });
                });
        }

        // Panels layout: top (fixed), right (table), map fills the remaining using CentralPanel
        super::top_panel::render(ctx, self);
        super::table_panel::render(ctx, self);
        super::map::render(ctx, self);
    }
}
