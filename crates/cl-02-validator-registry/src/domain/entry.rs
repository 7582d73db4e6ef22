//! Validator entry.

use serde::{Deserialize, Serialize};
use shared_types::Timestamp;

/// One registered validator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorEntry {
    /// Unique identity (email-like).
    pub identity: String,
    /// SPKI PEM of the validator's RSA public key.
    pub public_key: String,
    /// Whether this validator may currently author Pages.
    pub active: bool,
    /// When the entry was created.
    pub added_at: Timestamp,
}

impl ValidatorEntry {
    /// Create a new, active validator entry.
    pub fn new(identity: impl Into<String>, public_key: impl Into<String>, added_at: Timestamp) -> Self {
        Self {
            identity: identity.into(),
            public_key: public_key.into(),
            active: true,
            added_at,
        }
    }
}
