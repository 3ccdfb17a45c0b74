//! Couples the playback state machine to its periodic ticker.
//!
//! The driver owns the only `Ticker`. It is replaced in `load`, dropped when
//! playback finishes and dropped by `stop`; dropping a ticker is how pending
//! ticks are cancelled.

use embassy_time::{Duration, Ticker};

use super::controller::{PlaybackController, PlaybackEvent, PlaybackPhase};
use crate::location::LocationSequence;

pub struct PlaybackDriver {
    controller: PlaybackController,
    ticker: Option<Ticker>,
    interval: Duration,
}

impl PlaybackDriver {
    pub fn new(interval: Duration) -> Self {
        Self {
            controller: PlaybackController::new(),
            ticker: None,
            interval,
        }
    }

    /// Load a new sequence, cancelling any ticker armed for the previous one.
    pub fn load(&mut self, sequence: LocationSequence) -> Vec<PlaybackEvent> {
        self.ticker = None;
        let events = self.controller.load(sequence);
        if self.controller.phase() == PlaybackPhase::Playing {
            self.ticker = Some(Ticker::every(self.interval));
        }
        events
    }

    /// Handle one ticker firing.
    pub fn on_tick(&mut self) -> Vec<PlaybackEvent> {
        let events = self.controller.tick();
        if self.controller.phase() != PlaybackPhase::Playing {
            self.ticker = None;
        }
        events
    }

    /// Tear down: cancel the ticker and keep the state for inspection.
    pub fn stop(&mut self) {
        self.ticker = None;
    }

    pub fn is_armed(&self) -> bool {
        self.ticker.is_some()
    }

    pub fn controller(&self) -> &PlaybackController {
        &self.controller
    }

    /// Wait for the next tick. Never resolves while no ticker is armed.
    pub async fn next_tick(&mut self) {
        match self.ticker.as_mut() {
            Some(ticker) => ticker.next().await,
            None => core::future::pending::<()>().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::LocationRecord;
    use embassy_futures::block_on;
    use embassy_futures::select::{Either, select};
    use embassy_time::Timer;

    fn sequence(n: usize) -> LocationSequence {
        LocationSequence::new(
            (0..n)
                .map(|i| LocationRecord {
                    id: i.to_string(),
                    label: "RouteA".to_string(),
                    date: String::new(),
                    latitude: i as f64,
                    longitude: i as f64,
                    name: String::new(),
                })
                .collect(),
        )
    }

    fn driver() -> PlaybackDriver {
        PlaybackDriver::new(Duration::from_millis(2000))
    }

    #[test]
    fn arms_only_while_playing() {
        let mut d = driver();
        assert!(!d.is_armed());
        d.load(sequence(3));
        assert!(d.is_armed());
        d.on_tick();
        assert!(d.is_armed());
        d.on_tick();
        assert_eq!(d.controller().phase(), PlaybackPhase::Finished);
        assert!(!d.is_armed());
    }

    #[test]
    fn short_sequences_never_arm() {
        let mut d = driver();
        d.load(sequence(1));
        assert!(!d.is_armed());
        d.load(sequence(0));
        assert!(!d.is_armed());
    }

    #[test]
    fn empty_reload_cancels_running_ticker() {
        let mut d = driver();
        d.load(sequence(4));
        assert!(d.is_armed());
        d.load(LocationSequence::default());
        assert!(!d.is_armed());
        assert!(d.on_tick().is_empty());
    }

    #[test]
    fn reload_while_playing_restarts() {
        let mut d = driver();
        d.load(sequence(4));
        d.on_tick();
        d.on_tick();
        let events = d.load(sequence(4));
        assert!(d.is_armed());
        assert!(matches!(events[0], PlaybackEvent::Started { index: 0, .. }));
        assert_eq!(d.controller().current_index(), Some(0));
    }

    #[test]
    fn armed_ticker_fires() {
        let mut d = PlaybackDriver::new(Duration::from_millis(10));
        d.load(sequence(3));
        block_on(async {
            match select(d.next_tick(), Timer::after(Duration::from_secs(2))).await {
                Either::First(()) => {}
                Either::Second(()) => panic!("armed ticker never fired"),
            }
        });
        assert!(matches!(d.on_tick()[..], [PlaybackEvent::Advanced { index: 1, .. }]));
    }

    #[test]
    fn no_tick_after_finished() {
        let mut d = PlaybackDriver::new(Duration::from_millis(10));
        d.load(sequence(2));
        block_on(d.next_tick());
        assert_eq!(d.on_tick().len(), 2);
        assert_eq!(d.controller().phase(), PlaybackPhase::Finished);

        block_on(async {
            match select(d.next_tick(), Timer::after(Duration::from_millis(100))).await {
                Either::First(()) => panic!("tick fired after playback finished"),
                Either::Second(()) => {}
            }
        });
        assert_eq!(d.controller().current_index(), Some(1));
    }

    #[test]
    fn stop_disarms() {
        let mut d = driver();
        d.load(sequence(5));
        d.stop();
        assert!(!d.is_armed());
        assert_eq!(d.controller().current_index(), Some(0));
    }
}
