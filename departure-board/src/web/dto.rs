//! Data transfer objects for web responses.

use serde::Serialize;

use crate::board::{BoardRow, Headings};

/// Current board as JSON.
#[derive(Debug, Serialize)]
pub struct DeparturesResponse {
    /// False until the first snapshot has arrived
    pub loaded: bool,

    /// When the snapshot was fetched (RFC 3339)
    pub fetched_at: Option<String>,

    /// Error text reported by the feed itself
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feed_error: Option<String>,

    pub headings: Headings,

    pub departures: Vec<BoardRow>,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
