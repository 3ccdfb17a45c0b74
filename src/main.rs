use anyhow::Context;
use eframe::egui;
use embassy_executor::{Executor, Spawner};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use env_logger::Builder;
use log::{LevelFilter, info};
use std::path::Path;
use std::thread;

use crate::config::{AppConfig, CONFIG_FILE_NAME};
use crate::ui::{AppState, UICommand, UIRefreshState};

mod config;
mod location;
mod playback;
mod time_driver;
mod ui;

const UI_REFRESH_QUEUE_SIZE: usize = 100;
pub type UIRefreshQueue = embassy_sync::channel::Channel<CriticalSectionRawMutex, UIRefreshState, UI_REFRESH_QUEUE_SIZE>;
pub type UIRefreshQueueReceiver = embassy_sync::channel::Receiver<'static, CriticalSectionRawMutex, UIRefreshState, UI_REFRESH_QUEUE_SIZE>;
pub type UIRefreshQueueSender = embassy_sync::channel::Sender<'static, CriticalSectionRawMutex, UIRefreshState, UI_REFRESH_QUEUE_SIZE>;

const UI_COMMAND_QUEUE_SIZE: usize = 16;
pub type UICommandQueue = embassy_sync::channel::Channel<CriticalSectionRawMutex, UICommand, UI_COMMAND_QUEUE_SIZE>;
pub type UICommandQueueReceiver = embassy_sync::channel::Receiver<'static, CriticalSectionRawMutex, UICommand, UI_COMMAND_QUEUE_SIZE>;
pub type UICommandQueueSender = embassy_sync::channel::Sender<'static, CriticalSectionRawMutex, UICommand, UI_COMMAND_QUEUE_SIZE>;

fn embassy_init(spawner: Spawner, interval_ms: u64, ui_refresh_tx: UIRefreshQueueSender, ui_command_rx: UICommandQueueReceiver) {
    let _ = spawner.spawn(playback::playback_task(interval_ms, ui_refresh_tx, ui_command_rx));
}

fn main() -> anyhow::Result<()> {
    let (config, config_error) = AppConfig::load_or_default(Path::new(CONFIG_FILE_NAME));

    // Logging setup
    Builder::new()
        .filter_level(config.level_filter())
        .filter(Some("wgpu_core"), LevelFilter::Warn)
        .filter(Some("wgpu_hal"), LevelFilter::Warn)
        .filter(Some("naga"), LevelFilter::Warn)
        .init();

    if let Some(e) = config_error {
        log::error!("{:#}; using default configuration", e);
    }
    info!("Starting up with {:?}", config);

    let ui_refresh_channel: &'static UIRefreshQueue = Box::leak(Box::new(UIRefreshQueue::new()));
    let ui_command_channel: &'static UICommandQueue = Box::leak(Box::new(UICommandQueue::new()));

    let ui_refresh_tx = ui_refresh_channel.sender();
    let ui_refresh_rx = ui_refresh_channel.receiver();
    let ui_command_tx = ui_command_channel.sender();
    let ui_command_rx = ui_command_channel.receiver();

    // Spawn Embassy executor on a dedicated background thread
    let interval_ms = config.playback_interval_ms;
    thread::Builder::new()
        .name("embassy-executor".to_string())
        .spawn(move || {
            // Leak the executor to satisfy the 'static lifetime required by run()
            let executor: &'static mut Executor = Box::leak(Box::new(Executor::new()));
            executor.run(|spawner| embassy_init(spawner, interval_ms, ui_refresh_tx, ui_command_rx));
        })
        .context("failed to spawn embassy thread")?;

    // Start the GUI on the main thread (required on macOS)
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1280.0, 800.0]).with_title("Location Radar"),
        ..Default::default()
    };
    eframe::run_native(
        "Location Radar",
        native_options,
        Box::new(move |_cc| Ok(Box::new(AppState::new(ui_refresh_rx, ui_command_tx, &config)))),
    )
    .map_err(|e| anyhow::anyhow!("UI terminated with error: {}", e))?;

    info!("Shut down");
    Ok(())
}
