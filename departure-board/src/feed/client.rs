//! Departure feed HTTP client.
//!
//! One unauthenticated `GET` per fetch against
//! `{base}/{city}/{station}.json?frontend=json&no_lines={n}`.

use chrono::Local;
use reqwest::{StatusCode, Url};
use tracing::debug;

use super::error::FeedError;
use super::types::{FeedSnapshot, parse_feed};

/// Default base URL of the departure feed.
pub const DEFAULT_BASE_URL: &str = "https://vrrf.finalrewind.org";

/// Default number of departures requested per fetch.
const DEFAULT_NUMBER_OF_RESULTS: u16 = 10;

/// Configuration for the feed client.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Base URL for the feed (defaults to the public instance)
    pub base_url: String,
    /// City the station belongs to
    pub city: String,
    /// Station name as the feed knows it
    pub station: String,
    /// Number of departures to request
    pub number_of_results: u16,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl FeedConfig {
    /// Create a new config for the given city and station.
    pub fn new(city: impl Into<String>, station: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            city: city.into(),
            station: station.into(),
            number_of_results: DEFAULT_NUMBER_OF_RESULTS,
            timeout_secs: 30,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the number of departures to request.
    pub fn with_number_of_results(mut self, n: u16) -> Self {
        self.number_of_results = n;
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Build the station's feed URL.
    ///
    /// City and station are pushed as path segments, so names with spaces
    /// or umlauts are percent-encoded.
    pub fn endpoint(&self) -> Result<Url, FeedError> {
        let mut url =
            Url::parse(&self.base_url).map_err(|e| FeedError::InvalidUrl(e.to_string()))?;

        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| FeedError::InvalidUrl(format!("cannot be a base: {}", self.base_url)))?;
            segments
                .pop_if_empty()
                .push(&self.city)
                .push(&format!("{}.json", self.station));
        }

        url.query_pairs_mut()
            .append_pair("frontend", "json")
            .append_pair("no_lines", &self.number_of_results.to_string());

        Ok(url)
    }
}

/// Departure feed client for a single station.
#[derive(Debug, Clone)]
pub struct FeedClient {
    http: reqwest::Client,
    endpoint: Url,
}

impl FeedClient {
    /// Create a new feed client with the given configuration.
    pub fn new(config: FeedConfig) -> Result<Self, FeedError> {
        let endpoint = config.endpoint()?;

        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { http, endpoint })
    }

    /// The URL this client fetches.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Fetch and decode the current departures.
    ///
    /// `200` with a valid document is the only success. `401` maps to
    /// [`FeedError::Unauthorized`]; every other status is [`FeedError::Api`].
    pub async fn fetch_departures(&self) -> Result<FeedSnapshot, FeedError> {
        debug!(url = %self.endpoint, "fetching departures");

        let response = self.http.get(self.endpoint.clone()).send().await?;

        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            return Err(FeedError::Unauthorized);
        }

        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(FeedError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;
        let snapshot = parse_feed(&body, Local::now())?;

        debug!(departures = snapshot.len(), "feed decoded");
        Ok(snapshot)
    }
}
