//! # Validator Registry (CL-02)
//!
//! The persisted set of identities authorised to author Pages
//! (Proof of Authority).
//!
//! ## Lifecycle
//!
//! | Operation | Effect |
//! |-----------|--------|
//! | `add` | Inserts an active entry; no-op if the identity is already known, even if inactive |
//! | `remove` | Deactivates every matching entry; the record and key stay for historical verification |
//!
//! The registry is a flat list persisted as one JSON file, overwritten on
//! every mutation. It also serves as the [`cl_01_signatures::PublicKeyDirectory`]
//! the chain validator resolves keys from.

pub mod domain;
pub mod ports;
pub mod registry;

pub use domain::entry::ValidatorEntry;
pub use domain::errors::RegistryError;
pub use ports::ValidatorAuthority;
pub use registry::ValidatorRegistry;
