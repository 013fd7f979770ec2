//! Module: value::temporal
//! Responsibility: recognise date/time text and project it onto a numeric axis.
//! Does not own: comparison semantics (see `value::coerce`).

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];
const TIME_FORMAT: &str = "%H:%M:%S%.f";

/// Parse a date, datetime or RFC 3339 timestamp into epoch milliseconds (UTC).
#[must_use]
pub fn parse_instant_millis(text: &str) -> Option<i64> {
    let text = text.trim();

    // cheap reject before trying every format
    if text.len() < DATE_FORMAT.len() + 2 || !text.as_bytes()[0].is_ascii_digit() {
        return None;
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Some(ts.timestamp_millis());
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt.and_utc().timestamp_millis());
        }
    }

    NaiveDate::parse_from_str(text, DATE_FORMAT)
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp_millis())
}

/// Parse a time of day into milliseconds since midnight.
#[must_use]
pub fn parse_time_millis(text: &str) -> Option<i64> {
    let time = NaiveTime::parse_from_str(text.trim(), TIME_FORMAT).ok()?;
    let seconds = i64::from(time.num_seconds_from_midnight());
    let millis = i64::from(time.nanosecond() / 1_000_000);

    Some(seconds * 1_000 + millis)
}
