use super::*;
use chrono::Utc;
use pretty_assertions::assert_eq;

#[test]
fn test_format_duration() {
    assert_eq!(format_duration(Duration::ZERO), "0s");
    assert_eq!(format_duration(Duration::from_secs(30)), "30s");
    assert_eq!(format_duration(Duration::from_secs(60)), "1m");
    assert_eq!(format_duration(Duration::from_secs(3600)), "1h");
    assert_eq!(format_duration(Duration::from_secs(90_061)), "1d 1h 1m 1s");
    assert_eq!(format_duration(Duration::from_secs(86_400 + 5)), "1d 5s");
}

#[test]
fn test_format_duration_drops_fractions() {
    assert_eq!(format_duration(Duration::from_millis(59_999)), "59s");
}

#[test]
fn test_format_timestamp_in_utc() {
    assert_eq!(format_timestamp_in(0.0, &Utc), "1970-01-01 00:00:00");
    assert_eq!(
        format_timestamp_in(1_700_000_000.75, &Utc),
        "2023-11-14 22:13:20"
    );
}

#[test]
fn test_format_timestamp_out_of_range() {
    assert_eq!(format_timestamp_in(1e20, &Utc), "100000000000000000000");
}

#[test]
fn test_format_timestamp_local_shape() {
    let formatted = format_timestamp(1_700_000_000.0);
    assert_eq!(formatted.len(), "2023-11-14 22:13:20".len());
}
