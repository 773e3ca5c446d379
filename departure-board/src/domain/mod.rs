//! Domain types for the departure board.
//!
//! Feed records are kept close to their wire shape; the scheduled date and
//! time stay as strings until something asks for the combined instant, so a
//! single corrupt record never prevents the rest of a feed from loading.

mod departure;
mod time;

pub use departure::{RawDeparture, TransportType};
pub use time::{DepartureTime, TimeError};
