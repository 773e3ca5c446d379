//! Display rows for the departure board.
//!
//! Turns the latest snapshot into the rows a screen shows. Evaluated against
//! the time of rendering, so a board redrawn long after the last fetch still
//! drops departed vehicles and counts down correctly.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::Serialize;
use tokio::sync::RwLock;

use crate::feed::FeedSnapshot;
use crate::timing::{self, RelativeTimeLabels};

/// What the departure column shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayTimeOption {
    /// "3 min"
    #[default]
    Countdown,
    /// "14:30"
    Time,
    /// "14:30 (3 min)"
    TimeAndCountdown,
}

/// Error returned for an unknown display option.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown display time option '{0}' (expected countdown, time or time+countdown)")]
pub struct InvalidDisplayTimeOption(String);

impl FromStr for DisplayTimeOption {
    type Err = InvalidDisplayTimeOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "countdown" => Ok(DisplayTimeOption::Countdown),
            "time" => Ok(DisplayTimeOption::Time),
            "time+countdown" => Ok(DisplayTimeOption::TimeAndCountdown),
            other => Err(InvalidDisplayTimeOption(other.to_string())),
        }
    }
}

impl fmt::Display for DisplayTimeOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DisplayTimeOption::Countdown => "countdown",
            DisplayTimeOption::Time => "time",
            DisplayTimeOption::TimeAndCountdown => "time+countdown",
        };
        f.write_str(s)
    }
}

/// Column headings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Headings {
    pub line: String,
    pub destination: String,
    pub departure: String,
}

impl Headings {
    pub fn english() -> Self {
        Self {
            line: "Line".into(),
            destination: "Destination".into(),
            departure: "Departure".into(),
        }
    }

    pub fn german() -> Self {
        Self {
            line: "Linie".into(),
            destination: "Ziel".into(),
            departure: "Abfahrt".into(),
        }
    }
}

/// How the board is laid out.
#[derive(Debug, Clone)]
pub struct BoardConfig {
    /// Maximum rows shown.
    pub number_of_results: usize,
    pub display_icons: bool,
    pub time_option: DisplayTimeOption,
    /// Line labels longer than this many characters are cut.
    pub line_label_width: usize,
    /// Fixed table width in pixels; `None` lets the table size itself.
    pub table_width: Option<u32>,
    /// With a fixed width, cells longer than this many characters scroll.
    pub scroll_after: usize,
    pub labels: RelativeTimeLabels,
    pub headings: Headings,
}

impl BoardConfig {
    /// Whether a cell holding `text` is rendered as a scrolling marquee.
    pub fn scrolls(&self, text: &str) -> bool {
        self.table_width.is_some() && text.chars().count() > self.scroll_after
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            number_of_results: 10,
            display_icons: true,
            time_option: DisplayTimeOption::Countdown,
            line_label_width: 7,
            table_width: None,
            scroll_after: 15,
            labels: RelativeTimeLabels::english(),
            headings: Headings::english(),
        }
    }
}

/// One rendered departure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardRow {
    /// Icon name, absent when icons are disabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<&'static str>,
    pub line: String,
    pub destination: String,
    pub departure: String,
}

/// Build display rows from a snapshot as of `now`.
///
/// Departed and unparseable records are skipped before the result cap is
/// applied, so the board stays full while the snapshot still has entries.
pub fn build_rows(snapshot: &FeedSnapshot, now: NaiveDateTime, config: &BoardConfig) -> Vec<BoardRow> {
    timing::views(now, &snapshot.departures)
        .into_iter()
        .take(config.number_of_results)
        .map(|view| {
            let dep = view.departure;
            let countdown = view.remaining.label(&config.labels);
            let departure = match config.time_option {
                DisplayTimeOption::Countdown => countdown,
                DisplayTimeOption::Time => dep.scheduled_time.clone(),
                DisplayTimeOption::TimeAndCountdown => {
                    format!("{} ({})", dep.scheduled_time, countdown)
                }
            };
            BoardRow {
                icon: config.display_icons.then(|| dep.transport_type.icon()),
                line: truncate_label(&dep.line, config.line_label_width),
                destination: dep.destination.clone(),
                departure,
            }
        })
        .collect()
}

/// Cut a label to at most `width` characters.
///
/// Long-distance products come through as e.g. "InterCityExpress 123",
/// which does not fit a line column.
pub fn truncate_label(label: &str, width: usize) -> String {
    label.chars().take(width).collect()
}

/// The latest snapshot, shared between the notification consumer and readers.
///
/// Written only by the consumer of scheduler notifications; readers get the
/// whole `Arc` and never observe a partial update.
#[derive(Debug, Clone, Default)]
pub struct LatestBoard {
    inner: Arc<RwLock<Option<Arc<FeedSnapshot>>>>,
}

impl LatestBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored snapshot.
    pub async fn replace(&self, snapshot: Arc<FeedSnapshot>) {
        let mut guard = self.inner.write().await;
        *guard = Some(snapshot);
    }

    /// The stored snapshot, if one has arrived.
    pub async fn get(&self) -> Option<Arc<FeedSnapshot>> {
        let guard = self.inner.read().await;
        guard.clone()
    }

    /// Rows for the stored snapshot, or `None` before the first load.
    pub async fn rows(&self, now: NaiveDateTime, config: &BoardConfig) -> Option<Vec<BoardRow>> {
        let snapshot = self.get().await?;
        Some(build_rows(&snapshot, now, config))
    }
}
