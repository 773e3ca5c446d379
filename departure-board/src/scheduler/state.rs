//! Refresh state machine.
//!
//! The synchronous half of the scheduler: given the result of one fetch,
//! decide what to store, whom to tell, and when to fetch next. The async
//! driver in [`driver`](super::driver) only executes these decisions.

use std::sync::Arc;
use std::time::Duration;

use crate::feed::{FeedError, FeedSnapshot};

/// Where the scheduler is in its cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for the next fetch to be armed or to fire.
    Idle,
    /// One request is outstanding.
    Fetching,
    /// Polling has ended after a terminal failure.
    Stopped,
}

/// How a completed fetch is classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// `200` with a parseable document.
    Success,
    /// Network error, unexpected status or malformed document.
    TransientFailure,
    /// `401`; retrying cannot help.
    TerminalFailure,
}

impl Outcome {
    pub fn classify(result: &Result<FeedSnapshot, FeedError>) -> Self {
        match result {
            Ok(_) => Outcome::Success,
            Err(e) if e.is_terminal() => Outcome::TerminalFailure,
            Err(_) => Outcome::TransientFailure,
        }
    }
}

/// Requested wait before the next fetch.
///
/// `Immediate` (the "-1" request) and `Default` are distinct: the former
/// means no wait at all, the latter means the configured update interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delay {
    Immediate,
    After(Duration),
    Default,
}

impl Delay {
    /// Map a millisecond request onto a delay: `-1` is immediate, other
    /// negative values are unspecified, everything else is explicit.
    pub fn from_millis(ms: i64) -> Self {
        match ms {
            -1 => Delay::Immediate,
            ms if ms < 0 => Delay::Default,
            ms => Delay::After(Duration::from_millis(ms.unsigned_abs())),
        }
    }

    /// The concrete wait, using `update_interval` when none was requested.
    pub fn resolve(self, update_interval: Duration) -> Duration {
        match self {
            Delay::Immediate => Duration::ZERO,
            Delay::After(d) => d,
            Delay::Default => update_interval,
        }
    }
}

/// Message for the rendering layer.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    /// A new snapshot replaced the previous one.
    Snapshot {
        snapshot: Arc<FeedSnapshot>,
        /// True only for the first snapshot this scheduler ever stored.
        first_load: bool,
    },
    /// Polling stopped; redraw with whatever is already there.
    Redraw { snapshot: Option<Arc<FeedSnapshot>> },
}

/// Everything a completed fetch decided.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub outcome: Outcome,
    pub notification: Option<Notification>,
    /// `None` once polling must stop.
    pub next: Option<Delay>,
}

/// Per-instance scheduler state.
///
/// Only the scheduler's own task mutates this. The snapshot is swapped,
/// never edited, so any `Arc` handed out stays complete.
#[derive(Debug, Clone)]
pub struct ScheduleState {
    has_loaded_once: bool,
    phase: Phase,
    snapshot: Option<Arc<FeedSnapshot>>,
    retry_delay: Duration,
}

impl ScheduleState {
    pub fn new(retry_delay: Duration) -> Self {
        Self {
            has_loaded_once: false,
            phase: Phase::Idle,
            snapshot: None,
            retry_delay,
        }
    }

    pub fn has_loaded_once(&self) -> bool {
        self.has_loaded_once
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The most recent successful snapshot, if any.
    pub fn snapshot(&self) -> Option<&Arc<FeedSnapshot>> {
        self.snapshot.as_ref()
    }

    /// Enter `Fetching`. Returns false (and changes nothing) unless idle,
    /// which keeps at most one request outstanding.
    pub fn begin_fetch(&mut self) -> bool {
        if self.phase != Phase::Idle {
            return false;
        }
        self.phase = Phase::Fetching;
        true
    }

    /// Apply the result of the outstanding fetch.
    ///
    /// Returns `None` (and changes nothing) unless a fetch is outstanding.
    pub fn complete(&mut self, result: Result<FeedSnapshot, FeedError>) -> Option<Transition> {
        if self.phase != Phase::Fetching {
            return None;
        }

        let transition = match result {
            Ok(snapshot) => {
                let snapshot = Arc::new(snapshot);
                let first_load = !self.has_loaded_once;
                self.has_loaded_once = true;
                self.snapshot = Some(Arc::clone(&snapshot));
                self.phase = Phase::Idle;
                Transition {
                    outcome: Outcome::Success,
                    notification: Some(Notification::Snapshot {
                        snapshot,
                        first_load,
                    }),
                    next: Some(Delay::Immediate),
                }
            }
            Err(e) if e.is_terminal() => {
                self.phase = Phase::Stopped;
                Transition {
                    outcome: Outcome::TerminalFailure,
                    notification: Some(Notification::Redraw {
                        snapshot: self.snapshot.clone(),
                    }),
                    next: None,
                }
            }
            Err(_) => {
                self.phase = Phase::Idle;
                Transition {
                    outcome: Outcome::TransientFailure,
                    notification: None,
                    next: Some(Delay::After(self.retry_delay)),
                }
            }
        };
        Some(transition)
    }

    /// Stop without a terminal failure (teardown).
    pub fn stop(&mut self) {
        self.phase = Phase::Stopped;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RawDeparture, TransportType};
    use chrono::Local;

    const RETRY: Duration = Duration::from_secs(30);

    fn snapshot(lines: &[&str]) -> FeedSnapshot {
        let departures = lines
            .iter()
            .map(|l| RawDeparture::new(*l, "Hbf", TransportType::default(), "15-03-2024", "12:00"))
            .collect();
        FeedSnapshot::new(departures, Local::now())
    }

    fn server_error() -> FeedError {
        FeedError::Api {
            status: 502,
            message: "Bad Gateway".into(),
        }
    }

    fn run(state: &mut ScheduleState, result: Result<FeedSnapshot, FeedError>) -> Transition {
        assert!(state.begin_fetch());
        state.complete(result).unwrap()
    }

    #[test]
    fn initial_state() {
        let state = ScheduleState::new(RETRY);
        assert!(!state.has_loaded_once());
        assert_eq!(state.phase(), Phase::Idle);
        assert!(state.snapshot().is_none());
    }

    #[test]
    fn no_second_fetch_while_fetching() {
        let mut state = ScheduleState::new(RETRY);
        assert!(state.begin_fetch());
        assert!(!state.begin_fetch());
        assert_eq!(state.phase(), Phase::Fetching);
    }

    #[test]
    fn first_success_marks_loaded_and_runs_immediately() {
        let mut state = ScheduleState::new(RETRY);
        let t = run(&mut state, Ok(snapshot(&["U79"])));

        assert_eq!(t.outcome, Outcome::Success);
        assert_eq!(t.next, Some(Delay::Immediate));
        match t.notification {
            Some(Notification::Snapshot {
                snapshot,
                first_load,
            }) => {
                assert!(first_load);
                assert_eq!(snapshot.departures[0].line, "U79");
            }
            other => panic!("expected snapshot notification, got {other:?}"),
        }
        assert!(state.has_loaded_once());
        assert_eq!(state.phase(), Phase::Idle);
    }

    #[test]
    fn later_successes_are_not_first_load() {
        let mut state = ScheduleState::new(RETRY);
        run(&mut state, Ok(snapshot(&["1"])));

        for _ in 0..3 {
            let t = run(&mut state, Ok(snapshot(&["2"])));
            assert_eq!(t.next, Some(Delay::Immediate));
            assert!(matches!(
                t.notification,
                Some(Notification::Snapshot {
                    first_load: false,
                    ..
                })
            ));
            assert!(state.has_loaded_once());
        }
    }

    #[test]
    fn success_replaces_snapshot_wholesale() {
        let mut state = ScheduleState::new(RETRY);
        run(&mut state, Ok(snapshot(&["1", "2", "3"])));
        let old = Arc::clone(state.snapshot().unwrap());

        run(&mut state, Ok(snapshot(&["4"])));
        assert_eq!(state.snapshot().unwrap().len(), 1);
        // Readers holding the old snapshot still see it intact
        assert_eq!(old.len(), 3);
    }

    #[test]
    fn transient_failure_keeps_snapshot_and_retries() {
        let mut state = ScheduleState::new(RETRY);
        run(&mut state, Ok(snapshot(&["keep"])));
        let before = Arc::clone(state.snapshot().unwrap());

        for err in [
            server_error(),
            FeedError::Json {
                message: "eof".into(),
                body: None,
            },
        ] {
            let t = run(&mut state, Err(err));
            assert_eq!(t.outcome, Outcome::TransientFailure);
            assert_eq!(t.notification, None);
            assert_eq!(t.next, Some(Delay::After(RETRY)));
            assert!(Arc::ptr_eq(state.snapshot().unwrap(), &before));
            assert!(state.has_loaded_once());
        }
    }

    #[test]
    fn transient_failure_before_first_load_still_retries() {
        let mut state = ScheduleState::new(RETRY);
        let t = run(&mut state, Err(server_error()));

        assert_eq!(t.next, Some(Delay::After(RETRY)));
        assert!(!state.has_loaded_once());
        assert!(state.snapshot().is_none());
        assert_eq!(state.phase(), Phase::Idle);

        // And the eventual success is still the first load
        let t = run(&mut state, Ok(snapshot(&["1"])));
        assert!(matches!(
            t.notification,
            Some(Notification::Snapshot {
                first_load: true,
                ..
            })
        ));
    }

    #[test]
    fn unauthorized_stops_for_good() {
        let mut state = ScheduleState::new(RETRY);
        run(&mut state, Ok(snapshot(&["last"])));

        let t = run(&mut state, Err(FeedError::Unauthorized));
        assert_eq!(t.outcome, Outcome::TerminalFailure);
        assert_eq!(t.next, None);
        match t.notification {
            Some(Notification::Redraw { snapshot: Some(s) }) => {
                assert_eq!(s.departures[0].line, "last")
            }
            other => panic!("expected redraw with data, got {other:?}"),
        }

        assert_eq!(state.phase(), Phase::Stopped);
        assert!(!state.begin_fetch());
    }

    #[test]
    fn unauthorized_before_any_data_redraws_empty() {
        let mut state = ScheduleState::new(RETRY);
        let t = run(&mut state, Err(FeedError::Unauthorized));
        assert_eq!(t.notification, Some(Notification::Redraw { snapshot: None }));
        assert_eq!(t.next, None);
    }

    #[test]
    fn classify() {
        assert_eq!(Outcome::classify(&Ok(snapshot(&[]))), Outcome::Success);
        assert_eq!(
            Outcome::classify(&Err(FeedError::Unauthorized)),
            Outcome::TerminalFailure
        );
        assert_eq!(
            Outcome::classify(&Err(server_error())),
            Outcome::TransientFailure
        );
    }

    #[test]
    fn delay_resolution() {
        let interval = Duration::from_secs(60);
        assert_eq!(Delay::Immediate.resolve(interval), Duration::ZERO);
        assert_eq!(Delay::Default.resolve(interval), interval);
        assert_eq!(
            Delay::After(Duration::from_secs(30)).resolve(interval),
            Duration::from_secs(30)
        );
    }

    #[test]
    fn delay_from_millis_keeps_sentinel_distinct() {
        assert_eq!(Delay::from_millis(-1), Delay::Immediate);
        assert_eq!(Delay::from_millis(-5), Delay::Default);
        assert_eq!(Delay::from_millis(0), Delay::After(Duration::ZERO));
        assert_eq!(
            Delay::from_millis(30_000),
            Delay::After(Duration::from_secs(30))
        );
    }

    #[test]
    fn complete_without_fetch_is_ignored() {
        let mut state = ScheduleState::new(RETRY);
        assert_eq!(state.complete(Ok(snapshot(&["stray"]))), None);
        assert!(!state.has_loaded_once());
        assert!(state.snapshot().is_none());
        assert_eq!(state.phase(), Phase::Idle);

        run(&mut state, Ok(snapshot(&["1"])));
        assert_eq!(state.complete(Err(FeedError::Unauthorized)), None);
        assert_eq!(state.phase(), Phase::Idle);

        state.stop();
        assert_eq!(state.complete(Ok(snapshot(&["late"]))), None);
        assert_eq!(state.phase(), Phase::Stopped);
        assert_eq!(state.snapshot().unwrap().departures[0].line, "1");
    }

    #[test]
    fn stop_blocks_fetches() {
        let mut state = ScheduleState::new(RETRY);
        state.stop();
        assert!(!state.begin_fetch());
    }
}
