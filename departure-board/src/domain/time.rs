//! Departure time handling for the feed.
//!
//! The feed provides the scheduled departure as two strings: a date in
//! "DD-MM-YYYY" format and a time of day in "HH:MM" format. This module
//! combines them into a single local instant.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use std::fmt;

/// Error returned when parsing an invalid date or time string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid departure time: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }

    /// Short description of what was wrong with the input.
    pub fn reason(&self) -> &'static str {
        self.reason
    }
}

/// A scheduled departure instant in the station's local time.
///
/// # Examples
///
/// ```
/// use departure_board::domain::DepartureTime;
///
/// let t = DepartureTime::parse("15-03-2024", "14:30").unwrap();
/// assert_eq!(t.to_string(), "15-03-2024 14:30");
///
/// assert!(DepartureTime::parse("2024-03-15", "14:30").is_err());
/// assert!(DepartureTime::parse("15-03-2024", "25:00").is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DepartureTime(NaiveDateTime);

impl DepartureTime {
    /// Create a departure time from an already-validated instant.
    pub fn new(instant: NaiveDateTime) -> Self {
        Self(instant)
    }

    /// Parse the feed's `sched_date` ("DD-MM-YYYY") and `sched_time`
    /// ("HH:MM") pair.
    pub fn parse(date: &str, time: &str) -> Result<Self, TimeError> {
        let date = parse_dmy(date)?;
        let time = parse_hhmm(time)?;
        Ok(Self(date.and_time(time)))
    }

    /// Returns the combined local instant.
    pub fn instant(&self) -> NaiveDateTime {
        self.0
    }

    /// Returns the date component.
    pub fn date(&self) -> NaiveDate {
        self.0.date()
    }

    /// Returns the time component.
    pub fn time(&self) -> NaiveTime {
        self.0.time()
    }

    /// Signed span from `now` until this departure.
    ///
    /// Negative when the departure is already in the past.
    pub fn until(&self, now: NaiveDateTime) -> Duration {
        self.0.signed_duration_since(now)
    }
}

impl fmt::Debug for DepartureTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DepartureTime({self})")
    }
}

impl fmt::Display for DepartureTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:02}:{:02}",
            self.0.date().format("%d-%m-%Y"),
            self.0.hour(),
            self.0.minute()
        )
    }
}

/// Parse "DD-MM-YYYY".
fn parse_dmy(s: &str) -> Result<NaiveDate, TimeError> {
    if s.len() != 10 {
        return Err(TimeError::new("expected DD-MM-YYYY format"));
    }

    let bytes = s.as_bytes();
    if bytes[2] != b'-' || bytes[5] != b'-' {
        return Err(TimeError::new("expected dashes at positions 2 and 5"));
    }

    let day =
        parse_two_digits(&bytes[0..2]).ok_or_else(|| TimeError::new("invalid day digits"))?;
    let month =
        parse_two_digits(&bytes[3..5]).ok_or_else(|| TimeError::new("invalid month digits"))?;
    let year = parse_two_digits(&bytes[6..8])
        .zip(parse_two_digits(&bytes[8..10]))
        .map(|(hi, lo)| (hi * 100 + lo) as i32)
        .ok_or_else(|| TimeError::new("invalid year digits"))?;

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| TimeError::new("no such date"))
}

/// Parse "HH:MM".
fn parse_hhmm(s: &str) -> Result<NaiveTime, TimeError> {
    if s.len() != 5 {
        return Err(TimeError::new("expected HH:MM format"));
    }

    let bytes = s.as_bytes();
    if bytes[2] != b':' {
        return Err(TimeError::new("expected colon at position 2"));
    }

    let hour =
        parse_two_digits(&bytes[0..2]).ok_or_else(|| TimeError::new("invalid hour digits"))?;
    if hour > 23 {
        return Err(TimeError::new("hour must be 0-23"));
    }

    let minute = parse_two_digits(&bytes[3..5])
        .ok_or_else(|| TimeError::new("invalid minute digits"))?;
    if minute > 59 {
        return Err(TimeError::new("minute must be 0-59"));
    }

    NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(|| TimeError::new("invalid time"))
}

/// Parse two ASCII digit bytes into a u32.
fn parse_two_digits(bytes: &[u8]) -> Option<u32> {
    if bytes.len() != 2 {
        return None;
    }
    let d1 = (bytes[0] as char).to_digit(10)?;
    let d2 = (bytes[1] as char).to_digit(10)?;
    Some(d1 * 10 + d2)
}
