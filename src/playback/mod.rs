//! Timed playback of a location sequence.
//!
//! - `controller`: the Idle / Playing / Finished state machine
//! - `driver`: owns the periodic ticker alongside the controller
//! - `task`: Embassy task connecting the driver to the UI channels

pub mod controller;
pub mod driver;
pub mod task;

pub use controller::{PlaybackEvent, PlaybackPhase};
pub use task::playback_task;
