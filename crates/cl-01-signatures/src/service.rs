//! # Record Signing Service
//!
//! Application service implementing the `RecordSigner` port.
//!
//! ## Architecture
//!
//! - Uses the outbound port (`Keystore`) to resolve the signer's private key
//! - Delegates the RSA operation to `domain::pkcs1`

use crate::domain::errors::SignatureError;
use crate::domain::pkcs1;
use crate::ports::inbound::RecordSigner;
use crate::ports::outbound::{Keystore, PublicKeyDirectory};
use serde_json::Value;
use tracing::debug;

/// Signs records with the RSA key the keystore holds for each identity.
pub struct RsaRecordSigner<K: Keystore> {
    keystore: K,
}

impl<K: Keystore> RsaRecordSigner<K> {
    pub fn new(keystore: K) -> Self {
        Self { keystore }
    }

    pub fn keystore(&self) -> &K {
        &self.keystore
    }
}

impl<K: Keystore> RecordSigner for RsaRecordSigner<K> {
    fn sign(&self, payload: &Value, identity: &str) -> Result<String, SignatureError> {
        let private_key = self.keystore.private_key_for(identity)?;
        let signature = pkcs1::sign_record(&private_key, payload)?;
        debug!("[cl-01] Signed record for {}", identity);
        Ok(signature)
    }
}

/// Look up the PEM public key of `identity`.
///
/// # Errors
/// * `SignatureError::IdentityNotFound` - the directory does not know `identity`
pub fn resolve_public_key<D: PublicKeyDirectory + ?Sized>(
    directory: &D,
    identity: &str,
) -> Result<String, SignatureError> {
    directory.public_key_for(identity)
}
