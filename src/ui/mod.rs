// UI module for Location Radar
//
// This module organizes the UI into separate components:
// - `top_panel`: Title bar with the file-open control and playback status
// - `table_panel`: Records table with the current record highlighted
// - `map`: Central map with trail polyline and position marker
// - `app_state`: Application state management and main update loop

pub mod app_state;
pub mod map;
pub mod table_panel;
pub mod top_panel;

use std::path::PathBuf;

use crate::location::LocationSequence;
use crate::playback::PlaybackEvent;

pub use app_state::AppState;

/// Messages from the playback task to the UI.
#[derive(Debug)]
pub enum UIRefreshState {
    Alert(String),
    /// A file was parsed; replaces everything shown so far.
    SequenceLoaded {
        source: String,
        sequence: LocationSequence,
    },
    Playback(PlaybackEvent),
}

/// Commands from the UI to the playback task.
#[derive(Debug)]
pub enum UICommand {
    /// Files picked in the dialog; only the first one is loaded.
    LoadFiles(Vec<PathBuf>),
    Shutdown,
}
