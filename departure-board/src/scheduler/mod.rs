//! Refresh scheduling for the departure feed.
//!
//! Polling runs as an explicit state machine:
//!
//! ```text
//! Idle -> Fetching -> Success          -> Idle (next fetch immediately)
//!                  -> TransientFailure -> Idle (next fetch after retry delay)
//!                  -> TerminalFailure  -> Stopped
//! ```
//!
//! Exactly one fetch is outstanding at a time, so snapshots are applied in
//! the order they were requested.

mod driver;
mod state;

pub use driver::{RefreshScheduler, SchedulerConfig, SchedulerHandle};
pub use state::{Delay, Notification, Outcome, Phase, ScheduleState, Transition};
