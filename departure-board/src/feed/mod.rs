//! Departure feed client.
//!
//! Fetches the JSON departure list for one station. Key characteristics of
//! the feed:
//! - Departures arrive in a `raw` array, in departure order
//! - Scheduled times are split into a "DD-MM-YYYY" date and an "HH:MM" time,
//!   both in the station's local time
//! - Each record carries its own countdown, which is served from an upstream
//!   cache and lags by several minutes; it is never used for display

mod client;
mod error;
mod mock;
mod source;
mod types;

pub use client::{DEFAULT_BASE_URL, FeedClient, FeedConfig};
pub use error::FeedError;
pub use mock::MockFeed;
pub use source::DepartureSource;
pub use types::{FeedResponse, FeedSnapshot, parse_feed};
