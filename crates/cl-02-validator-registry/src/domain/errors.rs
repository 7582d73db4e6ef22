//! Registry error types.

use thiserror::Error;

/// Errors from registry operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// Identity is empty or contains whitespace/control characters.
    #[error("Invalid validator identity: {0:?}")]
    InvalidIdentity(String),

    /// `SYSTEM`, `GENESIS` and the other sentinels cannot be registered.
    #[error("Reserved identity cannot be registered: {0}")]
    ReservedIdentity(String),

    /// The supplied PEM is not an RSA public key.
    #[error("Invalid public key for {identity}: {reason}")]
    InvalidPublicKey { identity: String, reason: String },

    /// No entry exists for the identity.
    #[error("Validator not found: {0}")]
    NotFound(String),

    /// Registry file could not be read or written.
    #[error("Registry I/O error: {0}")]
    Io(String),

    /// Registry file exists but is not a valid validator list.
    #[error("Registry file corrupt: {0}")]
    Corrupt(String),
}
