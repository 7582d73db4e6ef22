//! # Hierarchical Ledger (cl-03)
//!
//! The append-only, hash-linked, five-tier ledger at the core of the civic
//! ledger. Pages record individual actions; coarser tiers fold them up over
//! time:
//!
//! ```text
//! Page ──24h──→ Chapter ──30d──→ Book ──365d──→ Part ──3650d──→ Series
//! ```
//!
//! Each tier is its own hash chain. Aggregate blocks reference the hashes of
//! the blocks they fold up.
//!
//! ## Domain Invariants
//!
//! | Invariant | Description |
//! |-----------|-------------|
//! | Linkage | `block[i].previous_hash == block[i-1].hash`; first block links to the zero hash |
//! | Hash Integrity | Stored hash equals a recomputation over the block's fields |
//! | Monotonic Index | A Page's index is the Page count at the moment it is appended |
//! | Authority | Pages are authored by an active validator or `SYSTEM` / `GENESIS` |
//! | Atomic Writes | A save replaces the whole chain file or changes nothing |
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - blocks, chain state, rollup engine, chain validator
//! - `ports/` - `LedgerApi` (inbound), persistence/content/clock (outbound)
//! - `adapters/` - atomic JSON file, in-memory store, process lock, content policy
//! - `service/` - `LedgerService`, the single-writer application service
//!
//! ## Usage
//!
//! ```ignore
//! use cl_03_ledger::{AtomicJsonFile, LedgerApi, LedgerConfig, LedgerDependencies, LedgerService};
//!
//! let service = LedgerService::new(deps, LedgerConfig::default());
//! let page = service.append_page(payload, "alice@example.org", None)?;
//! assert!(service.validate_chain());
//! ```

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use adapters::{
    AtomicJsonFile, FileReplacer, InMemoryChainStore, LedgerLock, LockError, PolicyDataValidator,
    RenameReplacer, SystemTimeSource,
};
pub use domain::{
    is_valid_successor, page_signing_payload, validate_against_predecessor, validate_chain,
    AppendError, Block, BlockBody, ChainFault, ChainReport, ChainState, ChainSummary,
    ChainValidator, ChildRef, ContentPolicy, LedgerConfig, LinkError, PersistenceError,
    RollupError, RollupOutcome, RollupSchedule, Tier, TierSummary,
};
pub use ports::{ChainPersistence, DataValidator, LedgerApi, TimeSource};
pub use service::{LedgerDependencies, LedgerService};
