//! Text encodings for dates and timestamps stored in SQLite.
//!
//! Timestamps are fixed-width RFC 3339 in UTC with microseconds, so that
//! lexical order in SQL equals chronological order.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};

use crate::errors::StorageError;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, StorageError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StorageError::CorruptRow(format!("invalid timestamp '{}': {}", raw, e)))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, StorageError> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|e| StorageError::CorruptRow(format!("invalid date '{}': {}", raw, e)))
}
