//! The seam between the scheduler and wherever departures come from.

use std::future::Future;

use super::client::FeedClient;
use super::error::FeedError;
use super::types::FeedSnapshot;

/// Anything that can produce a fresh [`FeedSnapshot`] on demand.
///
/// Implemented by the HTTP [`FeedClient`] and by [`MockFeed`](super::MockFeed)
/// for development and tests.
pub trait DepartureSource: Send + Sync + 'static {
    /// Perform one fetch. Each call is one network round trip for real sources.
    fn fetch(&self) -> impl Future<Output = Result<FeedSnapshot, FeedError>> + Send;
}

impl DepartureSource for FeedClient {
    fn fetch(&self) -> impl Future<Output = Result<FeedSnapshot, FeedError>> + Send {
        self.fetch_departures()
    }
}
