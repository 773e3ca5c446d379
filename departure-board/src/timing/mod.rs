//! Departure time filtering.
//!
//! Pure functions over feed records and a reference instant. Everything
//! here takes `now` as an argument so the render layer can evaluate a
//! snapshot against the time of rendering rather than the time of fetching.

mod filter;
mod labels;

pub use filter::{DepartureView, Remaining, filter_future, is_past, remaining, views};
pub use labels::RelativeTimeLabels;
