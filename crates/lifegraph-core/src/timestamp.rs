//! Timestamp parsing and storage encoding.
//!
//! Submissions may carry any reasonable date-time text. Once accepted, a
//! timestamp is normalized to UTC and encoded as fixed-width text
//! (`YYYY-MM-DDTHH:MM:SS.fffffffffZ`). Fixed width makes lexicographic
//! order equal chronological order, so the store can range-scan its
//! `timestamp` index with plain string comparisons.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};

/// Storage encoding of a UTC timestamp.
const STORAGE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.9fZ";

/// Length of the `YYYY-MM-DD` prefix of a stored timestamp.
const DATE_PREFIX_LEN: usize = 10;

/// Naive (offset-less) layouts accepted after RFC 3339 and RFC 2822.
/// Interpreted as UTC.
const NAIVE_DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Offset-carrying layouts that RFC 3339 parsing rejects.
const OFFSET_DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%z"];

/// Highest year the storage encoding can represent with four digits.
const MAX_YEAR: i32 = 9999;

/// Errors produced while parsing or decoding timestamps.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimestampError {
    /// The text is not a recognizable date-time.
    #[error("unparseable timestamp: {0}")]
    Unparseable(String),

    /// The date-time is valid but its year cannot be stored.
    #[error("timestamp year {0} is outside 0..=9999")]
    OutOfRange(i32),
}

/// Parse submitted date-time text into a UTC instant.
///
/// Accepted, in order: RFC 3339 with any offset, RFC 2822, a space
/// separated date-time with offset, a naive date-time (taken as UTC), and
/// a bare `YYYY-MM-DD` date (midnight UTC).
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, TimestampError> {
    let text = raw.trim();
    let parsed = parse_any(text).ok_or_else(|| TimestampError::Unparseable(raw.to_owned()))?;

    let year = parsed.year();
    if !(0..=MAX_YEAR).contains(&year) {
        return Err(TimestampError::OutOfRange(year));
    }
    Ok(parsed)
}

fn parse_any(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in OFFSET_DATETIME_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(text, format) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Encode a UTC instant in the fixed-width storage form.
pub fn to_storage(ts: DateTime<Utc>) -> String {
    ts.format(STORAGE_FORMAT).to_string()
}

/// Decode a stored timestamp.
pub fn from_storage(stored: &str) -> Result<DateTime<Utc>, TimestampError> {
    DateTime::parse_from_rfc3339(stored)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| TimestampError::Unparseable(format!("{stored}: {e}")))
}

/// Decode the `YYYY-MM-DD` prefix of a stored timestamp as a UTC date.
pub fn stored_date(stored: &str) -> Result<NaiveDate, TimestampError> {
    let prefix = stored
        .get(..DATE_PREFIX_LEN)
        .ok_or_else(|| TimestampError::Unparseable(stored.to_owned()))?;
    NaiveDate::parse_from_str(prefix, "%Y-%m-%d")
        .map_err(|e| TimestampError::Unparseable(format!("{stored}: {e}")))
}
