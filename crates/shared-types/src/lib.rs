//! # Shared Types Crate
//!
//! Value types shared by the ledger subsystems.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: hashes, timestamps, payloads and sentinel
//!   identities are defined once here and reused by every crate.
//! - **Canonical Encoding**: anything that is hashed or signed goes through
//!   [`canonical_json`], so two processes always agree on the bytes.
//! - **Lossless Timestamps**: a [`Timestamp`] keeps the exact string it was
//!   created or loaded with, because that string feeds the block hash.

pub mod canonical;
pub mod entities;
pub mod errors;
pub mod hash;
pub mod time;

pub use canonical::{canonical_json, canonicalize};
pub use entities::*;
pub use errors::*;
pub use hash::Hash256;
pub use time::Timestamp;
