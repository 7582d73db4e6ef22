//! # Outbound Ports (Driven Ports / SPI)
//!
//! Identity and key resolution. The host application decides where keys live;
//! the ledger only asks "who currently holds the credentials for this identity".

use crate::domain::errors::SignatureError;
use rsa::RsaPrivateKey;
use std::sync::Arc;

/// Resolves the private key held for an identity.
pub trait Keystore: Send + Sync {
    /// # Errors
    /// * `SignatureError::KeyNotFound` - nothing is stored for `identity`
    fn private_key_for(&self, identity: &str) -> Result<RsaPrivateKey, SignatureError>;
}

/// Resolves the PEM public key registered for an identity.
pub trait PublicKeyDirectory: Send + Sync {
    /// # Errors
    /// * `SignatureError::IdentityNotFound` - the identity is unknown
    fn public_key_for(&self, identity: &str) -> Result<String, SignatureError>;
}

impl<T: Keystore + ?Sized> Keystore for Arc<T> {
    fn private_key_for(&self, identity: &str) -> Result<RsaPrivateKey, SignatureError> {
        (**self).private_key_for(identity)
    }
}

impl<T: PublicKeyDirectory + ?Sized> PublicKeyDirectory for Arc<T> {
    fn public_key_for(&self, identity: &str) -> Result<String, SignatureError> {
        (**self).public_key_for(identity)
    }
}
