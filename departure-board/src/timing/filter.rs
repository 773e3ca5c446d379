//! Remaining-time computation and past-departure filtering.

use chrono::{Duration, NaiveDateTime};

use crate::domain::{DepartureTime, RawDeparture, TimeError};

/// Coarse time left until a departure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Remaining {
    /// Less than a minute away.
    Now,
    /// Whole minutes, 1 to 59.
    Minutes(u32),
    /// Whole hours, at least 1.
    Hours(u32),
}

impl Remaining {
    /// Bucket a span. Negative spans are treated as zero.
    pub fn from_duration(span: Duration) -> Self {
        let secs = span.num_seconds().max(0);
        if secs < 60 {
            return Remaining::Now;
        }

        // Round to the nearest minute, half up
        let minutes = (secs + 30) / 60;
        if minutes < 60 {
            return Remaining::Minutes(minutes as u32);
        }

        let hours = ((secs + 1800) / 3600).max(1);
        Remaining::Hours(u32::try_from(hours).unwrap_or(u32::MAX))
    }
}

/// A feed record paired with its time left, computed against one `now`.
///
/// Never stored: build fresh views on every render.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepartureView<'a> {
    pub departure: &'a RawDeparture,
    pub departs_at: DepartureTime,
    pub remaining: Remaining,
}

/// Whether the departure at `date`/`time` lies strictly before `now`.
///
/// A malformed pair is an error; callers filtering a feed should treat it as
/// excluded.
pub fn is_past(now: NaiveDateTime, date: &str, time: &str) -> Result<bool, TimeError> {
    let departs_at = DepartureTime::parse(date, time)?;
    Ok(departs_at.until(now) < Duration::zero())
}

/// Time left until the departure at `date`/`time`.
///
/// The feed carries its own countdown, but it lags by several minutes, so
/// the span is always recomputed here from the scheduled time.
pub fn remaining(now: NaiveDateTime, date: &str, time: &str) -> Result<Remaining, TimeError> {
    let departs_at = DepartureTime::parse(date, time)?;
    Ok(Remaining::from_duration(departs_at.until(now)))
}

/// Departures that have not left yet, in feed order.
///
/// Records whose date or time cannot be parsed are dropped.
pub fn filter_future(now: NaiveDateTime, records: &[RawDeparture]) -> Vec<&RawDeparture> {
    records
        .iter()
        .filter(|r| matches!(is_past(now, &r.scheduled_date, &r.scheduled_time), Ok(false)))
        .collect()
}

/// [`filter_future`] and [`remaining`] in a single pass.
pub fn views(now: NaiveDateTime, records: &[RawDeparture]) -> Vec<DepartureView<'_>> {
    records
        .iter()
        .filter_map(|departure| {
            let departs_at = departure.departure_time().ok()?;
            let span = departs_at.until(now);
            if span < Duration::zero() {
                return None;
            }
            Some(DepartureView {
                departure,
                departs_at,
                remaining: Remaining::from_duration(span),
            })
        })
        .collect()
}
