//! Runtime configuration.
//!
//! Defaults match a board for Düsseldorf Hauptbahnhof; every field can be
//! overridden from `DEPARTURES_*` environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::board::{BoardConfig, DisplayTimeOption, Headings};
use crate::feed::{DEFAULT_BASE_URL, FeedConfig};
use crate::scheduler::{Delay, SchedulerConfig};
use crate::timing::RelativeTimeLabels;

/// Errors from reading configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A variable was set but could not be parsed
    #[error("invalid value '{value}' for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },

    /// Number of results must be at least 1
    #[error("number of results must be positive")]
    NonPositiveResults,
}

/// Language of the board's wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    English,
    German,
}

impl Language {
    pub fn labels(self) -> RelativeTimeLabels {
        match self {
            Language::English => RelativeTimeLabels::english(),
            Language::German => RelativeTimeLabels::german(),
        }
    }

    pub fn headings(self) -> Headings {
        match self {
            Language::English => Headings::english(),
            Language::German => Headings::german(),
        }
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "en" => Ok(Language::English),
            "de" => Ok(Language::German),
            other => Err(format!("unsupported language '{other}' (expected en or de)")),
        }
    }
}

/// Complete configuration for one departure board.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Board redraw cadence (ms). Also the fallback fetch delay.
    pub update_interval_ms: u64,

    /// Wait after a failed fetch (ms).
    pub retry_delay_ms: u64,

    /// Wait before the first fetch (ms); -1 starts immediately.
    pub start_delay_ms: i64,

    pub city: String,
    pub station: String,

    /// Departures requested from the feed and shown on the board.
    pub number_of_results: u16,

    pub display_icons: bool,
    pub display_time_option: DisplayTimeOption,

    /// Line labels are cut to this many characters.
    pub line_label_width: usize,

    /// Fixed board width in pixels; 0 leaves the width to the browser.
    pub table_width: u32,

    /// With a fixed width, cells longer than this many characters scroll.
    pub scroll_after: usize,

    pub language: Language,

    /// Address the web board listens on.
    pub listen_addr: SocketAddr,

    pub feed_base_url: String,
    pub request_timeout_secs: u64,

    /// Serve this JSON file instead of calling the live feed.
    pub mock_file: Option<PathBuf>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            update_interval_ms: 60_000,
            retry_delay_ms: 30_000,
            start_delay_ms: -1,
            city: "Düsseldorf".to_string(),
            station: "Hauptbahnhof".to_string(),
            number_of_results: 10,
            display_icons: true,
            display_time_option: DisplayTimeOption::Countdown,
            line_label_width: 7,
            table_width: 0,
            scroll_after: 15,
            language: Language::English,
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            feed_base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: 30,
            mock_file: None,
        }
    }
}

impl MonitorConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`, starting from the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(city) = lookup("DEPARTURES_CITY") {
            config.city = city;
        }
        if let Some(station) = lookup("DEPARTURES_STATION") {
            config.station = station;
        }
        if let Some(url) = lookup("DEPARTURES_FEED_URL") {
            config.feed_base_url = url;
        }
        if let Some(path) = lookup("DEPARTURES_MOCK_FILE") {
            config.mock_file = Some(PathBuf::from(path));
        }

        parse_into(&lookup, "DEPARTURES_RESULTS", &mut config.number_of_results)?;
        parse_into(&lookup, "DEPARTURES_UPDATE_INTERVAL_MS", &mut config.update_interval_ms)?;
        parse_into(&lookup, "DEPARTURES_RETRY_DELAY_MS", &mut config.retry_delay_ms)?;
        parse_into(&lookup, "DEPARTURES_START_DELAY_MS", &mut config.start_delay_ms)?;
        parse_into(&lookup, "DEPARTURES_ICONS", &mut config.display_icons)?;
        parse_into(&lookup, "DEPARTURES_TIME_OPTION", &mut config.display_time_option)?;
        parse_into(&lookup, "DEPARTURES_LINE_WIDTH", &mut config.line_label_width)?;
        parse_into(&lookup, "DEPARTURES_TABLE_WIDTH", &mut config.table_width)?;
        parse_into(&lookup, "DEPARTURES_SCROLL_AFTER", &mut config.scroll_after)?;
        parse_into(&lookup, "DEPARTURES_LANGUAGE", &mut config.language)?;
        parse_into(&lookup, "DEPARTURES_LISTEN", &mut config.listen_addr)?;
        parse_into(&lookup, "DEPARTURES_TIMEOUT_SECS", &mut config.request_timeout_secs)?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.number_of_results == 0 {
            return Err(ConfigError::NonPositiveResults);
        }
        Ok(())
    }

    pub fn update_interval(&self) -> Duration {
        Duration::from_millis(self.update_interval_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn feed_config(&self) -> FeedConfig {
        FeedConfig::new(&self.city, &self.station)
            .with_base_url(&self.feed_base_url)
            .with_number_of_results(self.number_of_results)
            .with_timeout(self.request_timeout_secs)
    }

    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig {
            retry_delay: self.retry_delay(),
            update_interval: self.update_interval(),
            initial_delay: Delay::from_millis(self.start_delay_ms),
        }
    }

    pub fn board_config(&self) -> BoardConfig {
        BoardConfig {
            number_of_results: usize::from(self.number_of_results),
            display_icons: self.display_icons,
            time_option: self.display_time_option,
            line_label_width: self.line_label_width,
            table_width: (self.table_width > 0).then_some(self.table_width),
            scroll_after: self.scroll_after,
            labels: self.language.labels(),
            headings: self.language.headings(),
        }
    }
}

/// Overwrite `target` with the parsed value of `key`, if set.
fn parse_into<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    target: &mut T,
) -> Result<(), ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let Some(value) = lookup(key) else {
        return Ok(());
    };
    *target = value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        value: value.clone(),
        reason: e.to_string(),
    })?;
    Ok(())
}
