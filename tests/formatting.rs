use chrono::{Duration, TimeZone, Utc};
use sourcedeck::utils::coords::{dec_to_dms, ra_to_hms};
use sourcedeck::utils::datetime::{describe_timestamp, format_absolute, format_relative, parse_timestamp};

#[test]
fn test_right_ascension_to_hours() {
    assert_eq!(ra_to_hms(10.684708), "00:42:44.33");
    assert_eq!(ra_to_hms(0.0), "00:00:00.00");
    assert_eq!(ra_to_hms(180.0), "12:00:00.00");
    // Rounding up at the end of the circle wraps to zero
    assert_eq!(ra_to_hms(359.99999999), "00:00:00.00");
}

#[test]
fn test_declination_to_degrees() {
    assert_eq!(dec_to_dms(41.26875), "+41:16:07.5");
    assert_eq!(dec_to_dms(-5.5), "-05:30:00.0");
    assert_eq!(dec_to_dms(0.0), "+00:00:00.0");
    assert_eq!(dec_to_dms(-90.0), "-90:00:00.0");
}

#[test]
fn test_parse_backend_timestamps() {
    let expected = Utc.with_ymd_and_hms(2021, 3, 5, 8, 30, 0).unwrap();

    assert_eq!(parse_timestamp("2021-03-05T08:30:00"), Some(expected));
    assert_eq!(parse_timestamp("2021-03-05T08:30:00.000"), Some(expected));
    assert_eq!(parse_timestamp("2021-03-05 08:30:00"), Some(expected));
    assert_eq!(parse_timestamp("2021-03-05T10:30:00+02:00"), Some(expected));
    assert_eq!(parse_timestamp("yesterday"), None);
}

#[test]
fn test_absolute_format() {
    let dt = Utc.with_ymd_and_hms(2021, 3, 5, 8, 30, 0).unwrap();
    assert_eq!(format_absolute(&dt, "%Y-%m-%d", "%H:%M"), "2021-03-05 08:30");
}

#[test]
fn test_relative_format() {
    let now = Utc.with_ymd_and_hms(2021, 3, 5, 12, 0, 0).unwrap();

    assert_eq!(format_relative(&(now - Duration::seconds(10)), &now), "a few seconds ago");
    assert_eq!(format_relative(&(now - Duration::minutes(1)), &now), "1 minute ago");
    assert_eq!(format_relative(&(now - Duration::minutes(5)), &now), "5 minutes ago");
    assert_eq!(format_relative(&(now - Duration::hours(3)), &now), "3 hours ago");
    assert_eq!(format_relative(&(now - Duration::days(2)), &now), "2 days ago");
    assert_eq!(format_relative(&(now - Duration::days(90)), &now), "3 months ago");
    assert_eq!(format_relative(&(now - Duration::days(800)), &now), "2 years ago");
    assert_eq!(format_relative(&(now + Duration::hours(2)), &now), "in 2 hours");
    assert_eq!(format_relative(&(now + Duration::seconds(5)), &now), "in a few seconds");
}

#[test]
fn test_relative_format_rounds_into_next_unit() {
    let now = Utc.with_ymd_and_hms(2021, 3, 5, 12, 0, 0).unwrap();

    assert_eq!(format_relative(&(now - Duration::seconds(3570)), &now), "1 hour ago");
    assert_eq!(format_relative(&(now - Duration::seconds(85_000)), &now), "1 day ago");
    assert_eq!(format_relative(&(now - Duration::seconds(3500)), &now), "58 minutes ago");
    assert_eq!(format_relative(&(now - Duration::hours(23)), &now), "23 hours ago");
    assert_eq!(format_relative(&(now - Duration::days(30)), &now), "1 month ago");
    assert_eq!(format_relative(&(now - Duration::days(364)), &now), "1 year ago");
}

#[test]
fn test_describe_falls_back_to_raw_text() {
    let now = Utc.with_ymd_and_hms(2021, 3, 5, 12, 0, 0).unwrap();

    assert_eq!(describe_timestamp("2021-03-05T11:00:00", &now), "1 hour ago");
    assert_eq!(describe_timestamp("unknown", &now), "unknown");
}
