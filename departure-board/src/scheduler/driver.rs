//! Async refresh loop.
//!
//! Runs one [`ScheduleState`] on a single tokio task: fetch, apply the
//! transition, notify, wait, repeat. The only suspension points are the
//! fetch itself and the armed timer.

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::feed::DepartureSource;

use super::state::{Delay, Notification, Outcome, ScheduleState};

/// Notifications buffered ahead of the consumer.
const NOTIFICATION_CAPACITY: usize = 1;

/// Timing configuration for the refresh loop.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Wait after a transient failure.
    pub retry_delay: Duration,
    /// Wait used whenever no explicit delay is requested.
    pub update_interval: Duration,
    /// Wait before the very first fetch.
    pub initial_delay: Delay,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            retry_delay: Duration::from_millis(30_000),
            update_interval: Duration::from_millis(60_000),
            initial_delay: Delay::Immediate,
        }
    }
}

/// Spawns refresh loops.
pub struct RefreshScheduler;

impl RefreshScheduler {
    /// Start polling `source` on a new task.
    ///
    /// Returns a handle that stops the loop, and the receiving end of the
    /// notification channel. Dropping the receiver also stops the loop.
    ///
    /// The channel holds a single notification. A consumer that falls behind
    /// holds the loop at its next send, so fetches never outpace it.
    pub fn spawn<S: DepartureSource>(
        source: S,
        config: SchedulerConfig,
    ) -> (SchedulerHandle, mpsc::Receiver<Notification>) {
        let (tx, rx) = mpsc::channel(NOTIFICATION_CAPACITY);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let task = tokio::spawn(run(source, config, tx, shutdown_rx));

        let handle = SchedulerHandle {
            shutdown: shutdown_tx,
            task: Some(task),
        };
        (handle, rx)
    }
}

/// Owner of a running refresh loop.
///
/// Shutting down (or dropping) cancels the pending timer. A fetch already
/// in flight is allowed to finish and its result is thrown away.
#[derive(Debug)]
pub struct SchedulerHandle {
    shutdown: watch::Sender<bool>,
    task: Option<JoinHandle<ScheduleState>>,
}

impl SchedulerHandle {
    /// Stop the loop and wait for it to exit.
    ///
    /// Returns the final state, or `None` if the task panicked.
    pub async fn shutdown(mut self) -> Option<ScheduleState> {
        let _ = self.shutdown.send(true);
        let task = self.task.take()?;
        match task.await {
            Ok(state) => Some(state),
            Err(e) => {
                error!(error = %e, "refresh task failed");
                None
            }
        }
    }

    /// Whether the loop has exited on its own (terminal failure or
    /// consumer gone).
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(|t| t.is_finished())
    }
}

impl Drop for SchedulerHandle {
    fn drop(&mut self) {
        let _ = self.shutdown.send(true);
    }
}

/// The refresh loop. Never returns an error: every fetch failure is
/// classified by the state machine and logged here.
async fn run<S: DepartureSource>(
    source: S,
    config: SchedulerConfig,
    tx: mpsc::Sender<Notification>,
    mut shutdown: watch::Receiver<bool>,
) -> ScheduleState {
    let mut state = ScheduleState::new(config.retry_delay);

    if !wait(config.initial_delay.resolve(config.update_interval), &mut shutdown).await {
        state.stop();
        return state;
    }

    while state.begin_fetch() {
        let result = source.fetch().await;

        if *shutdown.borrow() {
            debug!("scheduler shut down during fetch; discarding result");
            state.stop();
            break;
        }

        if let Err(e) = &result {
            match Outcome::classify(&result) {
                Outcome::TerminalFailure => {
                    error!(error = %e, "feed refused request; polling stopped")
                }
                _ => warn!(
                    error = %e,
                    retry_in = ?config.retry_delay,
                    "could not load departures"
                ),
            }
        }

        let Some(transition) = state.complete(result) else {
            break;
        };

        if let Some(notification) = transition.notification {
            if let Notification::Snapshot {
                snapshot,
                first_load: true,
            } = &notification
            {
                info!(departures = snapshot.len(), "first departures loaded");
            }
            if !notify(&tx, notification, &mut shutdown).await {
                state.stop();
                break;
            }
        }

        let Some(delay) = transition.next else {
            break;
        };

        if !wait(delay.resolve(config.update_interval), &mut shutdown).await {
            state.stop();
            break;
        }
    }

    state
}

/// Hand a notification to the consumer, waiting for room in the channel.
///
/// Returns false when the receiver is gone or shutdown is requested while
/// waiting.
async fn notify(
    tx: &mpsc::Sender<Notification>,
    notification: Notification,
    shutdown: &mut watch::Receiver<bool>,
) -> bool {
    tokio::select! {
        sent = tx.send(notification) => {
            if sent.is_err() {
                debug!("notification receiver dropped; stopping scheduler");
            }
            sent.is_ok()
        }
        _ = shutdown.changed() => {
            debug!("scheduler shut down while consumer was busy");
            false
        }
    }
}

/// Sleep for `duration` unless shutdown is requested first.
///
/// Returns false on shutdown.
async fn wait(duration: Duration, shutdown: &mut watch::Receiver<bool>) -> bool {
    if *shutdown.borrow() {
        return false;
    }
    if duration.is_zero() {
        // Still yield so a free-running loop cannot starve the runtime.
        tokio::task::yield_now().await;
        return !*shutdown.borrow();
    }

    tokio::select! {
        _ = tokio::time::sleep(duration) => !*shutdown.borrow(),
        _ = shutdown.changed() => false,
    }
}
