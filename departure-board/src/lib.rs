//! Live departure board.
//!
//! Polls a public-transit departure feed for one station and keeps a
//! display-ready list of upcoming departures, filtered against the
//! current time whenever it is rendered.

pub mod board;
pub mod config;
pub mod domain;
pub mod feed;
pub mod scheduler;
pub mod timing;
pub mod web;
