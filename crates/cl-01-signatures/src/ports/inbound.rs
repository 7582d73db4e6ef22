//! # Inbound Ports (Driving Ports / API)

use crate::domain::errors::SignatureError;
use serde_json::Value;
use std::sync::Arc;

/// Signs records on behalf of an identity.
///
/// Implementations must be thread-safe (`Send + Sync`).
pub trait RecordSigner: Send + Sync {
    /// Sign the canonical form of `payload` with the identity's private key.
    ///
    /// # Errors
    /// * `SignatureError::KeyNotFound` - no key is resolvable for `identity`
    /// * `SignatureError::SigningFailed` - the RSA operation failed
    fn sign(&self, payload: &Value, identity: &str) -> Result<String, SignatureError>;
}

impl<T: RecordSigner + ?Sized> RecordSigner for Arc<T> {
    fn sign(&self, payload: &Value, identity: &str) -> Result<String, SignatureError> {
        (**self).sign(payload, identity)
    }
}
