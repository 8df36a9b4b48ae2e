//! Human-readable durations and timestamps for command replies and logs.

use std::fmt::Display;
use std::time::Duration;

use chrono::DateTime;
use chrono::Local;
use chrono::TimeZone;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Formats whole seconds as `1d 2h 3m 4s`, omitting zero components.
pub fn format_duration(duration: Duration) -> String {
    let mut secs = duration.as_secs();
    let mut parts = Vec::new();
    for (unit, suffix) in [(86_400, "d"), (3_600, "h"), (60, "m")] {
        let count = secs / unit;
        if count > 0 {
            parts.push(format!("{count}{suffix}"));
            secs %= unit;
        }
    }
    if secs > 0 || parts.is_empty() {
        parts.push(format!("{secs}s"));
    }
    parts.join(" ")
}

/// Formats epoch seconds in the local timezone.
pub fn format_timestamp(epoch_secs: f64) -> String {
    format_timestamp_in(epoch_secs, &Local)
}

/// Formats epoch seconds in `tz`. Out-of-range values print as raw seconds.
pub fn format_timestamp_in<Tz>(epoch_secs: f64, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let whole = epoch_secs.floor();
    let nanos = ((epoch_secs - whole) * 1e9) as u32;
    match DateTime::from_timestamp(whole as i64, nanos) {
        Some(utc) => utc.with_timezone(tz).format(TIMESTAMP_FORMAT).to_string(),
        None => format!("{epoch_secs}"),
    }
}

#[cfg(test)]
#[path = "format.test.rs"]
mod tests;
