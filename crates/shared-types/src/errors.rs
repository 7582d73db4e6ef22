//! # Error Types
//!
//! Parse errors for the shared value types.

use thiserror::Error;

/// A string could not be parsed as a [`crate::Hash256`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HashParseError {
    /// Wrong number of hex characters.
    #[error("Invalid hash length: expected 64 hex characters, got {0}")]
    InvalidLength(usize),

    /// Characters outside lowercase hex.
    ///
    /// Uppercase hex is rejected too: it would re-serialize differently and
    /// change the hash of any block that embeds it.
    #[error("Non-canonical hash encoding: {0}")]
    NonCanonical(String),
}

/// A [`crate::Timestamp`] could not be interpreted as a UTC instant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unparseable timestamp: {raw}")]
pub struct TimestampError {
    pub raw: String,
}
