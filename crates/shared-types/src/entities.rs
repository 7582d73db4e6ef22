//! # Core Domain Entities
//!
//! Identities, payloads and the sentinel values that mark non-cryptographic
//! blocks.

pub use serde_json::{Map, Value};

/// Free-form record carried by a Page.
///
/// Payload shape is open-ended per action type, so it stays a JSON object.
pub type Payload = Map<String, Value>;

/// A validator identity (email-like string) or one of the system sentinels.
pub type Identity = String;

// =============================================================================
// SENTINELS
// =============================================================================

/// Sentinel identities and signatures.
pub mod sentinel {
    /// System-originated block, exempt from cryptographic verification.
    pub const SYSTEM: &str = "SYSTEM";
    /// Genesis block, exempt from cryptographic verification.
    pub const GENESIS: &str = "GENESIS";
    /// Periodic/system rollup marker, exempt from cryptographic verification.
    pub const PERIODIC: &str = "PERIODIC";
    /// Signing failed at append time; the block carries no signature.
    pub const UNSIGNED: &str = "UNSIGNED";
}

/// True for the two identities that may author a Page without registration.
pub fn is_system_identity(identity: &str) -> bool {
    identity == sentinel::SYSTEM || identity == sentinel::GENESIS
}

/// True for signature values that verification accepts without a key.
///
/// `UNSIGNED` is deliberately not exempt.
pub fn is_exempt_signature(signature: &str) -> bool {
    matches!(
        signature,
        sentinel::GENESIS | sentinel::PERIODIC | sentinel::SYSTEM
    )
}

/// True for any of the four sentinel signature values.
pub fn is_sentinel_signature(signature: &str) -> bool {
    is_exempt_signature(signature) || signature == sentinel::UNSIGNED
}
