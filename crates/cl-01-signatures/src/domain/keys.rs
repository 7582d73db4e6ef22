//! # RSA Key Pairs
//!
//! Generation and PEM import/export. Private keys are exported as PKCS#8,
//! public keys as SubjectPublicKeyInfo; PKCS#1 PEM is accepted on import.

use crate::domain::errors::SignatureError;
use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey, LineEnding};
use rsa::{RsaPrivateKey, RsaPublicKey};
use zeroize::Zeroizing;

/// Smallest modulus accepted for validator keys.
pub const MIN_KEY_BITS: usize = 2048;

/// RSA key pair held by a validator.
///
/// `RsaPrivateKey` zeroizes its limbs on drop.
#[derive(Clone)]
pub struct RsaKeyPair {
    private_key: RsaPrivateKey,
}

impl RsaKeyPair {
    /// Default modulus size.
    pub const DEFAULT_BITS: usize = 2048;

    /// Generate a fresh key pair.
    pub fn generate(bits: usize) -> Result<Self, SignatureError> {
        if bits < MIN_KEY_BITS {
            return Err(SignatureError::KeyGeneration(format!(
                "{} bits is below the {} bit minimum",
                bits, MIN_KEY_BITS
            )));
        }
        let mut rng = rand::thread_rng();
        let private_key = RsaPrivateKey::new(&mut rng, bits)
            .map_err(|e| SignatureError::KeyGeneration(e.to_string()))?;
        Ok(Self { private_key })
    }

    /// Wrap an existing private key.
    pub fn from_private_key(private_key: RsaPrivateKey) -> Self {
        Self { private_key }
    }

    /// Load from a PKCS#8 or PKCS#1 PEM document.
    pub fn from_private_pem(pem: &str) -> Result<Self, SignatureError> {
        let private_key = RsaPrivateKey::from_pkcs8_pem(pem)
            .or_else(|_| RsaPrivateKey::from_pkcs1_pem(pem))
            .map_err(|e| SignatureError::InvalidKey(e.to_string()))?;
        Ok(Self { private_key })
    }

    pub fn private_key(&self) -> &RsaPrivateKey {
        &self.private_key
    }

    pub fn public_key(&self) -> RsaPublicKey {
        self.private_key.to_public_key()
    }

    /// PKCS#8 PEM of the private key.
    pub fn private_key_pem(&self) -> Result<Zeroizing<String>, SignatureError> {
        self.private_key
            .to_pkcs8_pem(LineEnding::LF)
            .map_err(|e| SignatureError::InvalidKey(e.to_string()))
    }

    /// SubjectPublicKeyInfo PEM of the public key.
    pub fn public_key_pem(&self) -> Result<String, SignatureError> {
        self.public_key()
            .to_public_key_pem(LineEnding::LF)
            .map_err(|e| SignatureError::InvalidKey(e.to_string()))
    }
}

/// Parse an SPKI (`BEGIN PUBLIC KEY`) or PKCS#1 (`BEGIN RSA PUBLIC KEY`) PEM.
pub fn parse_public_key_pem(pem: &str) -> Result<RsaPublicKey, SignatureError> {
    RsaPublicKey::from_public_key_pem(pem)
        .or_else(|_| RsaPublicKey::from_pkcs1_pem(pem))
        .map_err(|e| SignatureError::InvalidKey(e.to_string()))
}
