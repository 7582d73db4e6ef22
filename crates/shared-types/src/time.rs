//! # Timestamps
//!
//! Block timestamps are ISO-8601 UTC strings with a literal `Z` suffix.
//! Older chain files may contain naive timestamps (no offset) or `+00:00`
//! offsets; those are kept verbatim so stored hashes still verify, and are
//! read as UTC when compared.

use crate::errors::TimestampError;
use chrono::{DateTime, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// ISO-8601 timestamp string as stored in a block.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(String);

impl Timestamp {
    /// Format a UTC instant with microsecond precision and a `Z` suffix.
    pub fn from_datetime(instant: DateTime<Utc>) -> Self {
        Self(instant.to_rfc3339_opts(SecondsFormat::Micros, true))
    }

    pub fn now() -> Self {
        Self::from_datetime(Utc::now())
    }

    /// Wrap a string read from storage without reformatting it.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Interpret the timestamp as a UTC instant.
    ///
    /// Naive timestamps are treated as already being UTC.
    pub fn to_utc(&self) -> Result<DateTime<Utc>, TimestampError> {
        if let Ok(parsed) = DateTime::parse_from_rfc3339(&self.0) {
            return Ok(parsed.with_timezone(&Utc));
        }
        NAIVE_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(&self.0, format).ok())
            .map(|naive| Utc.from_utc_datetime(&naive))
            .ok_or_else(|| TimestampError {
                raw: self.0.clone(),
            })
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timestamp({})", self.0)
    }
}
