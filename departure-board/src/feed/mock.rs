//! Mock departure source for running without the live feed.
//!
//! Either replays a fixed JSON document on every fetch, or plays back a
//! script of outcomes one fetch at a time.

use std::collections::VecDeque;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::Local;
use tokio::sync::Mutex;

use super::error::FeedError;
use super::source::DepartureSource;
use super::types::{FeedSnapshot, parse_feed};

#[derive(Debug)]
enum Mode {
    /// Parse the same body on every fetch.
    Fixed(String),
    /// Pop one outcome per fetch.
    Scripted(VecDeque<Result<FeedSnapshot, FeedError>>),
}

/// Mock feed that serves data from a JSON file or a scripted sequence.
///
/// Clones share state, so a test can keep a handle and inspect
/// [`calls`](Self::calls) after moving a clone into the scheduler.
#[derive(Debug, Clone)]
pub struct MockFeed {
    mode: Arc<Mutex<Mode>>,
    calls: Arc<AtomicUsize>,
}

impl MockFeed {
    /// Load a feed document from disk and serve it on every fetch.
    ///
    /// The document is validated up front so a broken file fails at startup.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, FeedError> {
        let path = path.as_ref();
        let body = std::fs::read_to_string(path).map_err(|e| FeedError::Api {
            status: 0,
            message: format!("Failed to read {}: {}", path.display(), e),
        })?;
        parse_feed(&body, Local::now())?;
        Ok(Self::with_mode(Mode::Fixed(body)))
    }

    /// Serve each outcome once, in order.
    ///
    /// Once the script runs out every fetch fails with a 503.
    pub fn scripted(outcomes: impl IntoIterator<Item = Result<FeedSnapshot, FeedError>>) -> Self {
        Self::with_mode(Mode::Scripted(outcomes.into_iter().collect()))
    }

    fn with_mode(mode: Mode) -> Self {
        Self {
            mode: Arc::new(Mutex::new(mode)),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of fetches performed so far, across all clones.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn next(&self) -> Result<FeedSnapshot, FeedError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut mode = self.mode.lock().await;
        match &mut *mode {
            Mode::Fixed(body) => parse_feed(body, Local::now()),
            Mode::Scripted(outcomes) => outcomes.pop_front().unwrap_or_else(|| {
                Err(FeedError::Api {
                    status: 503,
                    message: "mock script exhausted".to_string(),
                })
            }),
        }
    }
}

impl DepartureSource for MockFeed {
    fn fetch(&self) -> impl Future<Output = Result<FeedSnapshot, FeedError>> + Send {
        self.next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"{"raw": [
        {"line": "U75", "destination": "Neuss Hbf", "type": "U-Bahn",
         "sched_date": "15-03-2024", "sched_time": "14:30"}
    ]}"#;

    #[tokio::test]
    async fn fixed_file_serves_every_fetch() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let feed = MockFeed::from_json_file(file.path()).unwrap();
        for _ in 0..3 {
            let snapshot = feed.fetch().await.unwrap();
            assert_eq!(snapshot.departures[0].line, "U75");
        }
        assert_eq!(feed.calls(), 3);
    }

    #[test]
    fn broken_file_fails_up_front() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{ not json").unwrap();

        assert!(matches!(
            MockFeed::from_json_file(file.path()),
            Err(FeedError::Json { .. })
        ));
        assert!(MockFeed::from_json_file("/definitely/not/here.json").is_err());
    }

    #[tokio::test]
    async fn script_plays_in_order_then_fails() {
        let feed = MockFeed::scripted([
            Err(FeedError::Unauthorized),
            Ok(FeedSnapshot::new(Vec::new(), Local::now())),
        ]);

        assert!(matches!(feed.fetch().await, Err(FeedError::Unauthorized)));
        assert!(feed.fetch().await.unwrap().is_empty());
        assert!(matches!(
            feed.fetch().await,
            Err(FeedError::Api { status: 503, .. })
        ));
        assert_eq!(feed.calls(), 3);
    }

    #[tokio::test]
    async fn clones_share_state() {
        let feed = MockFeed::scripted([Ok(FeedSnapshot::new(Vec::new(), Local::now()))]);
        let other = feed.clone();

        assert!(other.fetch().await.is_ok());
        assert_eq!(feed.calls(), 1);
        assert!(feed.fetch().await.is_err());
    }
}
