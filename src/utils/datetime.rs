//! Date and time utility functions
//!
//! Backend timestamps come in a few shapes (RFC3339, or naive ISO 8601 with or
//! without fractional seconds, always meaning UTC). This module parses them and
//! formats them either absolutely or relative to "now".

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};

/// Standard date format used for filter dates and absolute display
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Naive timestamp layouts the backend is known to emit
const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
];

/// Parse a backend timestamp, treating naive values as UTC
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Format a timestamp as `YYYY-MM-DD HH:MM` (UTC)
pub fn format_absolute(dt: &DateTime<Utc>, date_format: &str, time_format: &str) -> String {
    dt.format(&format!("{} {}", date_format, time_format)).to_string()
}

/// Human-readable distance between `then` and `now`, e.g. "3 days ago"
pub fn format_relative(then: &DateTime<Utc>, now: &DateTime<Utc>) -> String {
    let seconds = (*now - *then).num_seconds();
    let future = seconds < 0;
    let seconds = seconds.unsigned_abs();

    if seconds < 45 {
        let text = if future { "in a few seconds" } else { "a few seconds ago" };
        return text.to_string();
    }

    // Round before picking the unit, so 59.5 minutes is "1 hour"
    let minutes = (seconds + 30) / 60;
    let hours = (seconds + 1800) / 3600;
    let days = (seconds + 43_200) / 86_400;
    let (amount, unit) = if minutes < 60 {
        (minutes, "minute")
    } else if hours < 24 {
        (hours, "hour")
    } else if days < 30 {
        (days, "day")
    } else if days / 30 < 12 {
        (days / 30, "month")
    } else {
        (days / 365, "year")
    };

    let amount = amount.max(1);
    let plural = if amount == 1 { "" } else { "s" };
    if future {
        format!("in {} {}{}", amount, unit, plural)
    } else {
        format!("{} {}{} ago", amount, unit, plural)
    }
}

/// Relative description of a raw backend timestamp, or the raw text if it
/// cannot be parsed
pub fn describe_timestamp(value: &str, now: &DateTime<Utc>) -> String {
    match parse_timestamp(value) {
        Some(dt) => format_relative(&dt, now),
        None => value.to_string(),
    }
}
