//! Feed response DTOs and the parsed snapshot.

use chrono::{DateTime, Local};
use serde::{Deserialize, Deserializer};
use tracing::debug;

use crate::domain::RawDeparture;

use super::error::FeedError;

/// Maximum number of body characters kept in a parse error.
const BODY_EXCERPT_CHARS: usize = 500;

/// Top-level JSON document returned by the feed.
///
/// Only `raw` is required. The feed also sends a preformatted table and
/// other presentation fields, which are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedResponse {
    /// Departures in feed order. Entries that are not records at all are
    /// skipped.
    #[serde(deserialize_with = "lenient_records")]
    pub raw: Vec<RawDeparture>,

    /// Feed software version.
    #[serde(default)]
    pub version: Option<serde_json::Value>,

    /// Error text the feed reports alongside a (possibly empty) result.
    #[serde(default)]
    pub error: Option<serde_json::Value>,
}

/// One complete, successfully parsed feed response.
///
/// Snapshots are replaced wholesale on every successful fetch and shared
/// behind an `Arc`, so a reader always sees a consistent list.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedSnapshot {
    pub departures: Vec<RawDeparture>,
    pub fetched_at: DateTime<Local>,
    pub version: Option<String>,
    pub feed_error: Option<String>,
}

impl FeedSnapshot {
    /// Create a snapshot from departures alone.
    pub fn new(departures: Vec<RawDeparture>, fetched_at: DateTime<Local>) -> Self {
        Self {
            departures,
            fetched_at,
            version: None,
            feed_error: None,
        }
    }

    /// Build a snapshot from a decoded response.
    pub fn from_response(response: FeedResponse, fetched_at: DateTime<Local>) -> Self {
        Self {
            departures: response.raw,
            fetched_at,
            version: response.version.as_ref().and_then(value_text),
            feed_error: response.error.as_ref().and_then(value_text),
        }
    }

    pub fn len(&self) -> usize {
        self.departures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.departures.is_empty()
    }
}

/// Decode a feed body into a snapshot.
///
/// Fails as a whole only when the document itself is malformed; individual
/// records with odd dates are kept and left to the time filter.
pub fn parse_feed(body: &str, fetched_at: DateTime<Local>) -> Result<FeedSnapshot, FeedError> {
    let response: FeedResponse = serde_json::from_str(body).map_err(|e| FeedError::Json {
        message: e.to_string(),
        body: Some(body.chars().take(BODY_EXCERPT_CHARS).collect()),
    })?;
    Ok(FeedSnapshot::from_response(response, fetched_at))
}

/// Decode `raw` entry by entry so one unreadable record cannot fail the
/// whole document.
fn lenient_records<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<RawDeparture>, D::Error> {
    let entries = Vec::<serde_json::Value>::deserialize(deserializer)?;
    Ok(entries
        .into_iter()
        .filter_map(|entry| match serde_json::from_value(entry) {
            Ok(record) => Some(record),
            Err(e) => {
                debug!(error = %e, "skipping unreadable departure record");
                None
            }
        })
        .collect())
}

/// Render a scalar metadata value as text; null and empty strings are absent.
fn value_text(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) if s.is_empty() => None,
        serde_json::Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
