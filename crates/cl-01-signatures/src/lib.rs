//! # Record Signatures (CL-01)
//!
//! Binds a ledger record to a validator identity non-repudiably.
//!
//! ## Architecture
//!
//! This subsystem follows hexagonal architecture:
//! - **Domain Layer** (`domain/`): key pairs and the PKCS#1 v1.5 primitives
//! - **Ports Layer** (`ports/`): `RecordSigner` (inbound), `Keystore` and
//!   `PublicKeyDirectory` (outbound)
//! - **Adapters** (`adapters/`): file-backed and in-memory key resolution
//! - **Service Layer** (`service.rs`): `RsaRecordSigner`
//!
//! ## Scheme
//!
//! Records are serialized with [`shared_types::canonical_json`], signed with
//! RSA PKCS#1 v1.5 over SHA-256 and carried as standard base64.
//!
//! ## Sentinels
//!
//! `GENESIS`, `PERIODIC` and `SYSTEM` signatures always verify: they mark
//! system-originated or pre-authority records. `UNSIGNED` never verifies.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

// Re-export public API
pub use adapters::{FileKeystore, InMemoryDirectory, InMemoryKeystore};
pub use domain::errors::SignatureError;
pub use domain::keys::{parse_public_key_pem, RsaKeyPair};
pub use domain::pkcs1::{sign_record, verify_record};
pub use ports::inbound::RecordSigner;
pub use ports::outbound::{Keystore, PublicKeyDirectory};
pub use service::{resolve_public_key, RsaRecordSigner};
