//! # PKCS#1 v1.5 Record Signatures
//!
//! Sign and verify canonical JSON records with RSA PKCS#1 v1.5 / SHA-256.
//!
//! ## Verification Contract
//!
//! - Exempt sentinels (`GENESIS`, `PERIODIC`, `SYSTEM`) verify unconditionally.
//! - Every other failure (bad base64, wrong length, unparseable key, key
//!   mismatch, tampered record) returns `false` and is logged, never raised.

use crate::domain::errors::SignatureError;
use crate::domain::keys::parse_public_key_pem;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use rsa::pkcs1v15::{Signature, SigningKey, VerifyingKey};
use rsa::signature::{SignatureEncoding, Signer, Verifier};
use rsa::RsaPrivateKey;
use serde_json::Value;
use sha2::Sha256;
use shared_types::{canonical_json, is_exempt_signature};
use tracing::warn;

/// Sign `payload` and return the base64 signature.
pub fn sign_record(private_key: &RsaPrivateKey, payload: &Value) -> Result<String, SignatureError> {
    let message = canonical_json(payload);
    let signing_key = SigningKey::<Sha256>::new(private_key.clone());
    let signature = signing_key
        .try_sign(&message)
        .map_err(|e| SignatureError::SigningFailed(e.to_string()))?;
    Ok(STANDARD.encode(signature.to_bytes()))
}

/// Verify a base64 `signature` over `payload` against a PEM public key.
pub fn verify_record(payload: &Value, signature: &str, public_key_pem: &str) -> bool {
    if is_exempt_signature(signature) {
        return true;
    }
    match check_signature(payload, signature, public_key_pem) {
        Ok(()) => true,
        Err(e) => {
            warn!("[cl-01] Signature rejected: {}", e);
            false
        }
    }
}

fn check_signature(
    payload: &Value,
    signature: &str,
    public_key_pem: &str,
) -> Result<(), SignatureError> {
    let raw = STANDARD
        .decode(signature)
        .map_err(|_| SignatureError::MalformedSignature)?;
    let public_key = parse_public_key_pem(public_key_pem)?;
    let signature =
        Signature::try_from(raw.as_slice()).map_err(|_| SignatureError::MalformedSignature)?;

    VerifyingKey::<Sha256>::new(public_key)
        .verify(&canonical_json(payload), &signature)
        .map_err(|_| SignatureError::VerificationFailed)
}
