//! Playback state machine.
//!
//! Pure state: no timers, no channels. The driver feeds it ticks and decides
//! when a ticker must be armed from [`PlaybackController::phase`].
//!
//! ```text
//! Idle --load(non-empty)--> Playing --tick--> Playing --tick (last index)--> Finished
//!   ^                          |                                                |
//!   +------load(empty)---------+-------------------load(any)--------------------+
//! ```

use crate::location::{LocationRecord, LocationSequence};

/// Where playback currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackPhase {
    /// No sequence, or an empty one.
    #[default]
    Idle,
    /// More records remain after the current one.
    Playing,
    /// Holding at the last record.
    Finished,
}

/// Emitted whenever the current record changes or playback ends.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackEvent {
    /// A new non-empty sequence was loaded; `index` is always 0.
    Started { index: usize, record: LocationRecord },
    /// One tick moved the pointer forward.
    Advanced { index: usize, record: LocationRecord },
    /// The last record is reached; no further events follow until the next load.
    Finished { index: usize },
}

#[derive(Debug, Default)]
pub struct PlaybackController {
    sequence: LocationSequence,
    current_index: usize,
    phase: PlaybackPhase,
}

impl PlaybackController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the active sequence and restart from its first record.
    pub fn load(&mut self, sequence: LocationSequence) -> Vec<PlaybackEvent> {
        self.sequence = sequence;
        self.current_index = 0;

        let Some(first) = self.sequence.get(0).cloned() else {
            self.phase = PlaybackPhase::Idle;
            return Vec::new();
        };

        let mut events = vec![PlaybackEvent::Started { index: 0, record: first }];
        if self.sequence.len() == 1 {
            self.phase = PlaybackPhase::Finished;
            events.push(PlaybackEvent::Finished { index: 0 });
        } else {
            self.phase = PlaybackPhase::Playing;
        }
        events
    }

    /// Advance by exactly one record. No-op unless playing.
    pub fn tick(&mut self) -> Vec<PlaybackEvent> {
        if self.phase != PlaybackPhase::Playing {
            return Vec::new();
        }

        let next = self.current_index + 1;
        let Some(record) = self.sequence.get(next).cloned() else {
            self.phase = PlaybackPhase::Finished;
            return vec![PlaybackEvent::Finished { index: self.current_index }];
        };

        self.current_index = next;
        let mut events = vec![PlaybackEvent::Advanced { index: next, record }];
        if next + 1 == self.sequence.len() {
            self.phase = PlaybackPhase::Finished;
            events.push(PlaybackEvent::Finished { index: next });
        }
        events
    }

    pub fn phase(&self) -> PlaybackPhase {
        self.phase
    }

    /// Index of the current record, `None` while idle.
    pub fn current_index(&self) -> Option<usize> {
        match self.phase {
            PlaybackPhase::Idle => None,
            _ => Some(self.current_index),
        }
    }

    pub fn current_record(&self) -> Option<&LocationRecord> {
        self.current_index().and_then(|i| self.sequence.get(i))
    }

    /// Records visited so far, the current one included.
    pub fn trail(&self) -> &[LocationRecord] {
        match self.current_index() {
            Some(i) => &self.sequence.records()[..=i],
            None => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::parse;

    fn sequence(n: usize) -> LocationSequence {
        let records = (0..n)
            .map(|i| LocationRecord {
                id: i.to_string(),
                label: "RouteA".to_string(),
                date: format!("2024-01-{:02}", i + 1),
                latitude: 10.0 + i as f64,
                longitude: 20.0 + i as f64,
                name: format!("stop {i}"),
            })
            .collect();
        LocationSequence::new(records)
    }

    #[test]
    fn starts_idle() {
        let c = PlaybackController::new();
        assert_eq!(c.phase(), PlaybackPhase::Idle);
        assert_eq!(c.current_index(), None);
        assert!(c.trail().is_empty());
    }

    #[test]
    fn load_starts_at_first_record() {
        let mut c = PlaybackController::new();
        let seq = sequence(4);
        let events = c.load(seq.clone());
        assert_eq!(events, vec![PlaybackEvent::Started { index: 0, record: seq.get(0).unwrap().clone() }]);
        assert_eq!(c.phase(), PlaybackPhase::Playing);
        assert_eq!(c.current_index(), Some(0));
        assert_eq!(c.trail(), &seq.records()[..1]);
    }

    #[test]
    fn finishes_after_n_minus_one_ticks() {
        let n = 5;
        let mut c = PlaybackController::new();
        c.load(sequence(n));
        for k in 1..n {
            assert_eq!(c.phase(), PlaybackPhase::Playing);
            c.tick();
            assert_eq!(c.current_index(), Some(k));
        }
        assert_eq!(c.phase(), PlaybackPhase::Finished);
    }

    #[test]
    fn trail_is_prefix_through_current_index() {
        let n = 6;
        let seq = sequence(n);
        let mut c = PlaybackController::new();
        c.load(seq.clone());
        for k in 0..n - 1 {
            assert_eq!(c.trail().len(), k + 1);
            assert_eq!(c.trail(), &seq.records()[..=k]);
            c.tick();
        }
    }

    #[test]
    fn tick_emits_advanced_then_finished_on_last() {
        let seq = sequence(3);
        let mut c = PlaybackController::new();
        c.load(seq.clone());
        assert_eq!(c.tick(), vec![PlaybackEvent::Advanced { index: 1, record: seq.get(1).unwrap().clone() }]);
        assert_eq!(
            c.tick(),
            vec![
                PlaybackEvent::Advanced { index: 2, record: seq.get(2).unwrap().clone() },
                PlaybackEvent::Finished { index: 2 },
            ]
        );
    }

    #[test]
    fn ticks_after_finish_change_nothing() {
        let mut c = PlaybackController::new();
        c.load(sequence(2));
        c.tick();
        assert_eq!(c.phase(), PlaybackPhase::Finished);
        for _ in 0..3 {
            assert!(c.tick().is_empty());
        }
        assert_eq!(c.current_index(), Some(1));
        assert_eq!(c.trail().len(), 2);
    }

    #[test]
    fn single_record_finishes_immediately() {
        let mut c = PlaybackController::new();
        let events = c.load(sequence(1));
        assert_eq!(events.len(), 2);
        assert_eq!(events[1], PlaybackEvent::Finished { index: 0 });
        assert_eq!(c.phase(), PlaybackPhase::Finished);
        assert!(c.tick().is_empty());
    }

    #[test]
    fn empty_sequence_is_idle() {
        let mut c = PlaybackController::new();
        c.load(sequence(3));
        c.tick();
        assert!(c.load(LocationSequence::default()).is_empty());
        assert_eq!(c.phase(), PlaybackPhase::Idle);
        assert!(c.tick().is_empty());
        assert!(c.current_record().is_none());
    }

    #[test]
    fn reload_resets_to_first_record() {
        let input = "1,R,d,1.0,1.0,A\n2,R,d,2.0,2.0,B\n3,R,d,3.0,3.0,C\n";
        let mut c = PlaybackController::new();
        c.load(parse(input).unwrap());
        c.tick();
        c.tick();
        c.load(parse(input).unwrap());
        assert_eq!(c.phase(), PlaybackPhase::Playing);
        assert_eq!(c.current_index(), Some(0));
        assert_eq!(c.current_record().unwrap().id, "1");
        assert_eq!(c.trail().len(), 1);
    }

    #[test]
    fn example_file_plays_two_records() {
        let input = "1,RouteA,2024-01-01,10.0,20.0,Alice\n2,RouteA,2024-01-02,abc,21.0,Bob\n3,RouteA,2024-01-03,11.0,21.5,Carl\n";
        let mut c = PlaybackController::new();
        c.load(parse(input).unwrap());
        assert_eq!(c.current_record().unwrap().id, "1");
        c.tick();
        assert_eq!(c.current_record().unwrap().id, "3");
        assert_eq!(c.phase(), PlaybackPhase::Finished);
        assert!(c.tick().is_empty());
        assert_eq!(c.current_record().unwrap().id, "3");
    }
}
