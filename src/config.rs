//! Application configuration loaded from `location-radar.toml`.
//!
//! Every key is optional; a missing file means all defaults.

use anyhow::{Context, bail};
use log::LevelFilter;
use serde::Deserialize;
use std::path::Path;

/// File name looked up in the working directory at startup.
pub const CONFIG_FILE_NAME: &str = "location-radar.toml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct AppConfig {
    /// Time between two playback ticks in milliseconds.
    pub playback_interval_ms: u64,
    /// Global log level (`error`, `warn`, `info`, `debug`, `trace`, `off`).
    pub log_level: String,
    /// Text shown next to the current-position marker.
    pub marker_label: String,
    /// Initial width of the records table panel in pixels.
    pub table_width: f32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            playback_interval_ms: 2000,
            log_level: "info".to_string(),
            marker_label: "Current Location".to_string(),
            table_width: 520.0,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Returns
    /// * `Ok(AppConfig)` if the file was read, parsed and validated
    /// * `Err` with the failing step as context otherwise
    pub fn load(config_path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(config_path).with_context(|| format!("Failed to read config file {}", config_path.display()))?;
        Self::from_toml(&content).with_context(|| format!("Invalid config file {}", config_path.display()))
    }

    /// Load `path` if it exists, defaults otherwise.
    ///
    /// An unreadable or invalid file is reported to the caller so it can be
    /// logged once logging is up; defaults are used in that case too.
    pub fn load_or_default(path: &Path) -> (Self, Option<anyhow::Error>) {
        if !path.exists() {
            return (Self::default(), None);
        }
        match Self::load(path) {
            Ok(config) => (config, None),
            Err(e) => (Self::default(), Some(e)),
        }
    }

    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(content).context("Failed to parse TOML")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.playback_interval_ms == 0 {
            bail!("playback-interval-ms must be greater than zero");
        }
        if self.log_level.parse::<LevelFilter>().is_err() {
            bail!("unknown log-level '{}'", self.log_level);
        }
        if !(self.table_width.is_finite() && self.table_width > 0.0) {
            bail!("table-width must be a positive number");
        }
        Ok(())
    }

    /// Parsed log level; falls back to `Info` for values that skipped validation.
    pub fn level_filter(&self) -> LevelFilter {
        self.log_level.parse().unwrap_or(LevelFilter::Info)
    }
}
