//! Text encoding for transaction timestamps.
//!
//! Timestamps are naive UTC date-times with microsecond precision. They are
//! stored as fixed width text so that SQLite's string comparison and ordering
//! agree with chronological order.

use time::{
    Date, OffsetDateTime, PrimitiveDateTime, Time,
    format_description::BorrowedFormatItem,
    macros::format_description,
};

use crate::Error;

const STORAGE_FORMAT: &[BorrowedFormatItem] = format_description!(
    "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:6]"
);

const SECONDS_FORMAT: &[BorrowedFormatItem] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");

const INPUT_FORMATS: &[&[BorrowedFormatItem]] = &[
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"),
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]"),
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    format_description!("[year]-[month]-[day]T[hour]:[minute]"),
    format_description!("[year]-[month]-[day] [hour]:[minute]"),
];

const DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

/// The current UTC time, truncated to the stored precision.
pub fn now() -> PrimitiveDateTime {
    let now = OffsetDateTime::now_utc();

    truncate_to_micros(PrimitiveDateTime::new(now.date(), now.time()))
}

/// Drop anything finer than a microsecond.
pub fn truncate_to_micros(timestamp: PrimitiveDateTime) -> PrimitiveDateTime {
    let micros = timestamp.microsecond();

    // A microsecond count below one million always yields a valid nanosecond.
    timestamp
        .replace_nanosecond(micros * 1_000)
        .unwrap_or(timestamp)
}

/// Format a timestamp for storage.
pub fn to_storage_text(timestamp: PrimitiveDateTime) -> Result<String, Error> {
    timestamp
        .format(STORAGE_FORMAT)
        .map_err(|error| Error::InvalidTimestamp(error.to_string()))
}

/// Parse a timestamp written by [to_storage_text].
pub fn from_storage_text(text: &str) -> Result<PrimitiveDateTime, Error> {
    PrimitiveDateTime::parse(text, STORAGE_FORMAT)
        .map_err(|error| Error::InvalidTimestamp(format!("\"{text}\": {error}")))
}

/// Render a timestamp as ISO-8601 for display.
///
/// The fractional part is only shown when the microseconds are non-zero.
pub fn to_iso8601(timestamp: PrimitiveDateTime) -> String {
    let format = if timestamp.microsecond() == 0 {
        SECONDS_FORMAT
    } else {
        STORAGE_FORMAT
    };

    timestamp
        .format(format)
        .unwrap_or_else(|_| format!("{} {}", timestamp.date(), timestamp.time()))
}

/// Parse a user supplied timestamp.
///
/// Accepts a bare date (taken as midnight) or a date and time separated by
/// `T` or a space, with optional seconds and fractional seconds.
///
/// # Errors
///
/// Returns [Error::InvalidTimestamp] if `text` matches none of the formats.
pub fn parse_timestamp(text: &str) -> Result<PrimitiveDateTime, Error> {
    let text = text.trim();

    for format in INPUT_FORMATS {
        if let Ok(timestamp) = PrimitiveDateTime::parse(text, format) {
            return Ok(truncate_to_micros(timestamp));
        }
    }

    Date::parse(text, DATE_FORMAT)
        .map(|date| PrimitiveDateTime::new(date, Time::MIDNIGHT))
        .map_err(|_| Error::InvalidTimestamp(format!("could not parse \"{text}\"")))
}
