//! # Civic Ledger Test Suite
//!
//! Cross-crate scenarios exercising the signer, the validator registry and
//! the ledger together over a real chain file.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── fixtures.rs      # File-backed ledger harness
//!     ├── scenarios.rs     # Signing, tampering, authority lifecycle
//!     ├── rollups.rs       # Catch-up and idempotence
//!     ├── persistence.rs   # Fault injection on the atomic write
//!     └── concurrency.rs   # Many threads, one writer
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p cl-tests
//! cargo test -p cl-tests integration::rollups
//! ```

pub mod integration;
