//! Relative-time wording.

use super::Remaining;

/// Unit words used when rendering a [`Remaining`] span.
///
/// Passed explicitly to [`Remaining::label`] instead of living in global locale
/// state, so two boards in different languages can share a process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelativeTimeLabels {
    /// Shown for departures less than a minute away.
    pub now: String,
    pub minute: String,
    pub minutes: String,
    pub hour: String,
    pub hours: String,
}

impl RelativeTimeLabels {
    /// Create labels from custom words.
    pub fn new(
        now: impl Into<String>,
        minute: impl Into<String>,
        minutes: impl Into<String>,
        hour: impl Into<String>,
        hours: impl Into<String>,
    ) -> Self {
        Self {
            now: now.into(),
            minute: minute.into(),
            minutes: minutes.into(),
            hour: hour.into(),
            hours: hours.into(),
        }
    }

    pub fn english() -> Self {
        Self::new("now", "min", "min", "hour", "hours")
    }

    pub fn german() -> Self {
        Self::new("jetzt", "Min.", "Min.", "Std.", "Std.")
    }
}

impl Default for RelativeTimeLabels {
    fn default() -> Self {
        Self::english()
    }
}

impl Remaining {
    /// Render the span, e.g. "now", "1 min", "3 min", "+1 hour", "2 hours".
    pub fn label(self, labels: &RelativeTimeLabels) -> String {
        match self {
            Remaining::Now => labels.now.clone(),
            Remaining::Minutes(1) => format!("1 {}", labels.minute),
            Remaining::Minutes(n) => format!("{n} {}", labels.minutes),
            Remaining::Hours(1) => format!("+1 {}", labels.hour),
            Remaining::Hours(n) => format!("{n} {}", labels.hours),
        }
    }
}
