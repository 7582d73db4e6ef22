//! # Adapters Module
//!
//! Key resolution adapters.
//!
//! ## Modules
//!
//! - `keystore`: private keys from a key directory or memory
//! - `directory`: in-memory public key directory for tests and tooling

pub mod directory;
pub mod keystore;

pub use directory::InMemoryDirectory;
pub use keystore::{FileKeystore, InMemoryKeystore};
