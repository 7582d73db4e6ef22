//! # Inbound Ports (Driving Ports)
//!
//! The API the ledger exposes to the host application: "append a record
//! signed by validator X" and "read back the chain / check its integrity".

use crate::domain::block::{Block, Tier};
use crate::domain::chain::{ChainState, ChainSummary};
use crate::domain::errors::{AppendError, PersistenceError};
use crate::domain::rollup::RollupOutcome;
use crate::domain::validation::ChainReport;
use shared_types::{Hash256, Payload};

/// Primary API of the ledger.
///
/// Writes are serialized internally; every read works on a fresh snapshot
/// loaded from durable storage.
pub trait LedgerApi {
    /// Append a Page authored by `author`, then run the rollup checks.
    ///
    /// Without `signature` the service signs for registered validators and
    /// uses the identity itself for `SYSTEM` / `GENESIS`. A signing failure
    /// stores the Page as `UNSIGNED`.
    ///
    /// ## Errors
    ///
    /// - `InvalidInput`: empty payload or author
    /// - `InvalidData`: rejected by the content policy
    /// - `UnknownValidator`: author is not an active validator
    /// - `ConcurrencyConflict`: the Page count changed under the append
    /// - `ChainIntegrity`: the Page does not link onto the tail
    /// - `Persistence`: the write failed
    /// - `Halted`: an earlier write failed fatally
    fn append_page(&self, payload: Payload, author: &str, signature: Option<&str>)
        -> Result<Block, AppendError>;

    /// Append the genesis Page if the chain has no pages.
    ///
    /// Returns `None` when the chain was already initialized.
    fn initialize_genesis(&self) -> Result<Option<Block>, AppendError>;

    /// Run the rollup checks without appending a Page.
    fn run_rollups(&self) -> Result<RollupOutcome, AppendError>;

    /// Tail of `tier`.
    fn last_block(&self, tier: Tier) -> Result<Option<Block>, PersistenceError>;

    fn block(&self, tier: Tier, index: u64) -> Result<Option<Block>, PersistenceError>;

    /// Page with the given hash.
    fn find_page(&self, hash: &Hash256) -> Result<Option<Block>, PersistenceError>;

    /// Pages authored by `identity`, in chain order.
    fn pages_by_validator(&self, identity: &str) -> Result<Vec<Block>, PersistenceError>;

    fn summary(&self) -> Result<ChainSummary, PersistenceError>;

    /// Full point-in-time copy of the chain.
    fn snapshot(&self) -> Result<ChainState, PersistenceError>;

    /// Every fault in the stored chain.
    fn chain_report(&self) -> Result<ChainReport, PersistenceError>;

    /// True only if the stored chain has no faults. Faults are logged.
    fn validate_chain(&self) -> bool;
}
