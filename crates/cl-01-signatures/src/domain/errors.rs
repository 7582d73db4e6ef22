//! # Signature Errors
//!
//! Error types for signing, verification and key resolution.

use thiserror::Error;

/// Errors that can occur while signing a record or resolving keys.
///
/// Verification never surfaces these to callers; [`crate::verify_record`]
/// logs the cause and returns `false`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SignatureError {
    /// No private key can be resolved for the identity.
    #[error("No private key for identity: {0}")]
    KeyNotFound(String),

    /// The directory has no public key for the identity.
    #[error("Identity not found: {0}")]
    IdentityNotFound(String),

    /// The identity cannot be mapped onto a key location.
    #[error("Invalid identity for key resolution: {0}")]
    InvalidIdentity(String),

    /// Underlying RSA signing fault.
    #[error("Signing failed: {0}")]
    SigningFailed(String),

    /// PEM or DER key material could not be decoded.
    #[error("Invalid key material: {0}")]
    InvalidKey(String),

    /// The signature is not valid base64 or has the wrong length.
    #[error("Malformed signature encoding")]
    MalformedSignature,

    /// Signature does not match the record and key.
    #[error("Signature verification failed")]
    VerificationFailed,

    /// RSA key generation failed.
    #[error("Key generation failed: {0}")]
    KeyGeneration(String),

    /// Reading or writing key files failed.
    #[error("Keystore I/O error: {0}")]
    Io(String),
}
