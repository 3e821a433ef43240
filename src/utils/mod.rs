//! Utility modules for the sourcedeck application.
//!
//! - [`datetime`] - Timestamp parsing and absolute/relative formatting
//! - [`coords`] - Sexagesimal and decimal coordinate formatting

pub mod coords;
pub mod datetime;
