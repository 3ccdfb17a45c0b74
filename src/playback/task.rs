//! Playback async task running on the Embassy executor.
//!
//! Coordinates:
//! - File loading requested by the UI
//! - Tick-driven advancement of the current record
//! - Forwarding playback events to the UI

use embassy_futures::select::{Either, select};
use embassy_time::Duration;
use std::path::PathBuf;

use crate::location::load_first;
use crate::ui::{UICommand, UIRefreshState};
use crate::{UICommandQueueReceiver, UIRefreshQueueSender};

use super::controller::PlaybackEvent;
use super::driver::PlaybackDriver;

/// Main playback task.
///
/// # Parameters
///
/// * `interval_ms` - Period between ticks while playing
/// * `ui_refresh_tx` - Channel for sending UI updates
/// * `ui_command_rx` - Channel for receiving UI commands
#[embassy_executor::task]
pub async fn playback_task(interval_ms: u64, ui_refresh_tx: UIRefreshQueueSender, ui_command_rx: UICommandQueueReceiver) {
    run_playback(interval_ms, ui_refresh_tx, ui_command_rx).await;
}

/// Task body; returns once `Shutdown` is received.
async fn run_playback(interval_ms: u64, ui_refresh_tx: UIRefreshQueueSender, ui_command_rx: UICommandQueueReceiver) {
    log::info!("Playback task started, tick interval {} ms", interval_ms);

    let mut driver = PlaybackDriver::new(Duration::from_millis(interval_ms));

    loop {
        let woken = select(ui_command_rx.receive(), driver.next_tick()).await;
        match woken {
            Either::First(UICommand::LoadFiles(paths)) => {
                load_files(&paths, &mut driver, &ui_refresh_tx).await;
            }
            Either::First(UICommand::Shutdown) => {
                driver.stop();
                log::info!("Playback task stopped");
                return;
            }
            Either::Second(()) => {
                let events = driver.on_tick();
                if let Some(record) = driver.controller().current_record() {
                    log::debug!("Now at #{} ({}, {})", record.id, record.latitude, record.longitude);
                }
                if !driver.is_armed() {
                    log::info!("Playback finished, trail has {} points", driver.controller().trail().len());
                }
                publish(events, &ui_refresh_tx).await;
            }
        }
    }
}

/// Load the selected files and restart playback.
///
/// A failed load leaves the current sequence and its ticker untouched.
async fn load_files(paths: &[PathBuf], driver: &mut PlaybackDriver, ui_refresh_tx: &UIRefreshQueueSender) {
    let sequence = match load_first(paths) {
        Ok(s) => s,
        Err(e) => {
            log::error!("Error loading location file: {}", e);
            ui_refresh_tx.send(UIRefreshState::Alert(format!("Could not load file. {}", e))).await;
            return;
        }
    };

    let source = paths
        .first()
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    ui_refresh_tx
        .send(UIRefreshState::SequenceLoaded {
            source,
            sequence: sequence.clone(),
        })
        .await;

    let events = driver.load(sequence);
    publish(events, ui_refresh_tx).await;
}

/// Forward events to the UI.
///
/// `Advanced` is dropped when the queue is full: the next one carries the
/// index anyway, and waiting here would stop the loop from seeing `Shutdown`
/// while the window is not drawing.
async fn publish(events: Vec<PlaybackEvent>, ui_refresh_tx: &UIRefreshQueueSender) {
    for event in events {
        log::debug!("Playback event: {:?}", event);
        if matches!(event, PlaybackEvent::Advanced { .. }) {
            if ui_refresh_tx.try_send(UIRefreshState::Playback(event)).is_err() {
                log::debug!("UI refresh queue full, position update dropped");
            }
        } else {
            ui_refresh_tx.send(UIRefreshState::Playback(event)).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{UICommandQueue, UIRefreshQueue};
    use embassy_futures::block_on;
    use embassy_futures::join::join;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const INTERVAL_MS: u64 = 10;

    fn channels() -> (&'static UIRefreshQueue, &'static UICommandQueue) {
        (Box::leak(Box::new(UIRefreshQueue::new())), Box::leak(Box::new(UICommandQueue::new())))
    }

    fn route_file(records: usize) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        for i in 0..records {
            writeln!(file, "{i},RouteA,2024-01-01,{i}.0,{i}.5,stop{i}").unwrap();
        }
        file.flush().unwrap();
        file
    }

    /// Short description of a refresh message, for comparing whole runs.
    fn describe(msg: &UIRefreshState) -> String {
        match msg {
            UIRefreshState::Alert(_) => "alert".to_string(),
            UIRefreshState::SequenceLoaded { sequence, .. } => format!("loaded {}", sequence.len()),
            UIRefreshState::Playback(PlaybackEvent::Started { index, .. }) => format!("started {index}"),
            UIRefreshState::Playback(PlaybackEvent::Advanced { index, .. }) => format!("advanced {index}"),
            UIRefreshState::Playback(PlaybackEvent::Finished { index }) => format!("finished {index}"),
        }
    }

    #[test]
    fn plays_loaded_file_to_the_end() {
        let file = route_file(3);
        let (refresh, command) = channels();

        let ui = async {
            command.send(UICommand::LoadFiles(vec![file.path().to_path_buf()])).await;
            let mut seen = Vec::new();
            loop {
                let msg = refresh.receive().await;
                let finished = matches!(msg, UIRefreshState::Playback(PlaybackEvent::Finished { .. }));
                seen.push(describe(&msg));
                if finished {
                    break;
                }
            }
            command.send(UICommand::Shutdown).await;
            seen
        };

        let ((), seen) = block_on(join(run_playback(INTERVAL_MS, refresh.sender(), command.receiver()), ui));
        assert_eq!(seen, vec!["loaded 3", "started 0", "advanced 1", "advanced 2", "finished 2"]);
        assert!(refresh.try_receive().is_err());
    }

    #[test]
    fn failed_load_keeps_previous_playback_running() {
        let file = route_file(1000);
        let missing = file.path().with_extension("missing.csv");
        let (refresh, command) = channels();

        let ui = async {
            command.send(UICommand::LoadFiles(vec![file.path().to_path_buf()])).await;
            assert_eq!(describe(&refresh.receive().await), "loaded 1000");
            assert_eq!(describe(&refresh.receive().await), "started 0");
            assert_eq!(describe(&refresh.receive().await), "advanced 1");

            command.send(UICommand::LoadFiles(vec![missing])).await;
            let mut last_index = 1;
            loop {
                match refresh.receive().await {
                    UIRefreshState::Alert(text) => {
                        assert!(text.starts_with("Could not load file."));
                        break;
                    }
                    UIRefreshState::Playback(PlaybackEvent::Advanced { index, .. }) => last_index = index,
                    other => panic!("unexpected message: {}", describe(&other)),
                }
            }

            match refresh.receive().await {
                UIRefreshState::Playback(PlaybackEvent::Advanced { index, .. }) => assert_eq!(index, last_index + 1),
                other => panic!("unexpected message: {}", describe(&other)),
            }
            command.send(UICommand::Shutdown).await;
        };

        block_on(join(run_playback(INTERVAL_MS, refresh.sender(), command.receiver()), ui));
    }

    #[test]
    fn shutdown_ends_task_while_playing() {
        let file = route_file(1000);
        let (refresh, command) = channels();

        let ui = async {
            command.send(UICommand::LoadFiles(vec![file.path().to_path_buf()])).await;
            assert_eq!(describe(&refresh.receive().await), "loaded 1000");
            assert_eq!(describe(&refresh.receive().await), "started 0");
            command.send(UICommand::Shutdown).await;
        };

        // Returning at all means the loop exited with the ticker still armed.
        block_on(join(run_playback(INTERVAL_MS, refresh.sender(), command.receiver()), ui));
    }

    #[test]
    fn full_queue_drops_position_updates_only() {
        let (refresh, _) = channels();
        while refresh.try_send(UIRefreshState::Alert(String::new())).is_ok() {}

        let record = crate::location::parse("1,R,d,1.0,2.0,A
").unwrap().get(0).unwrap().clone();
        block_on(publish(vec![PlaybackEvent::Advanced { index: 1, record }], &refresh.sender()));
        assert!(refresh.is_full());

        let mut drained = 0;
        while let Ok(msg) = refresh.try_receive() {
            assert_eq!(describe(&msg), "alert");
            drained += 1;
        }
        assert!(drained > 0);
    }
}
