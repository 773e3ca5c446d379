//! Feed client error types.

/// Errors from fetching or decoding the departure feed.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// Request never completed (connection refused, DNS, timeout, ...)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Feed rejected the request as unauthorized
    #[error("unauthorized: the feed refused this station request")]
    Unauthorized,

    /// Feed answered with a status other than 200 or 401
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Body was not a valid feed document
    #[error("JSON parse error: {message}")]
    Json {
        message: String,
        body: Option<String>,
    },

    /// Endpoint could not be built from the configuration
    #[error("invalid feed URL: {0}")]
    InvalidUrl(String),
}

impl FeedError {
    /// Whether retrying cannot help without a configuration change.
    ///
    /// Only an authorization failure is terminal; network errors, unexpected
    /// statuses and malformed payloads are expected to clear up on retry.
    pub fn is_terminal(&self) -> bool {
        matches!(self, FeedError::Unauthorized)
    }
}
