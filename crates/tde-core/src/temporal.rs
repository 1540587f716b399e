//! # Temporal Types — UTC-Only Timestamps
//!
//! `Timestamp` stamps audit records, integrity reports and history events.
//! It is always UTC and truncated to seconds, so a record serialized today
//! and re-read later renders the same `generated_at` string.

use chrono::{DateTime, NaiveDate, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// A UTC timestamp truncated to seconds precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Current UTC time, truncated.
    pub fn now() -> Self {
        Self(truncate_to_seconds(Utc::now()))
    }

    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(truncate_to_seconds(dt))
    }

    /// Parse an RFC 3339 string, converting any offset to UTC.
    pub fn parse(s: &str) -> Result<Self, chrono::ParseError> {
        let dt = DateTime::parse_from_rfc3339(s)?;
        Ok(Self(truncate_to_seconds(dt.with_timezone(&Utc))))
    }

    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Calendar date of the timestamp, used as the audit `as_of_date`.
    pub fn date(&self) -> NaiveDate {
        self.0.date_naive()
    }

    /// `YYYY-MM-DDTHH:MM:SSZ`.
    pub fn to_iso8601(&self) -> String {
        self.0.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }

    /// `YYYYMMDD_HHMMSS`, safe for file names.
    pub fn file_stamp(&self) -> String {
        self.0.format("%Y%m%d_%H%M%S").to_string()
    }

    /// `DD/MM/YYYY HH:MM:SS`, used in report footers.
    pub fn to_br(&self) -> String {
        self.0.format("%d/%m/%Y %H:%M:%S").to_string()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

fn truncate_to_seconds(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.with_nanosecond(0).unwrap_or(dt)
}
