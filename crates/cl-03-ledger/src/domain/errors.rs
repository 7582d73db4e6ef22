//! # Ledger Errors
//!
//! Validation-type errors (`InvalidInput`, `InvalidData`, `UnknownValidator`,
//! `ChainIntegrity`) are rejected before anything is written. Only a fatal
//! [`PersistenceError`] represents a risk of data loss.

use crate::domain::block::Tier;
use crate::domain::chain::LinkError;
use thiserror::Error;

/// Errors returned by `append_page` and the other write operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppendError {
    /// Malformed caller arguments (empty payload, empty author).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Payload rejected by the content policy.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// Author is neither an active validator nor a system identity.
    #[error("{0} is not an active validator")]
    UnknownValidator(String),

    /// Page index no longer matches the persisted Page count.
    #[error("concurrent modification: expected index {expected}, chain has {actual} pages")]
    ConcurrencyConflict { expected: u64, actual: u64 },

    /// Candidate block does not link onto its tier.
    #[error("chain integrity violation in {tier} tier: {source}")]
    ChainIntegrity {
        tier: Tier,
        #[source]
        source: LinkError,
    },

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    /// A previous fatal persistence error stopped all writes.
    #[error("ledger halted after a fatal persistence error; operator intervention required")]
    Halted,
}

impl AppendError {
    /// Fatal errors halt the ledger.
    pub fn is_fatal(&self) -> bool {
        matches!(self, AppendError::Persistence(e) if e.is_fatal())
    }
}

/// Errors from the durable chain store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersistenceError {
    /// The chain file could not be read.
    #[error("failed to read chain file: {0}")]
    Load(String),

    /// The chain file exists but does not parse.
    #[error("chain file is corrupt: {0}")]
    Corrupt(String),

    /// The write failed; the previous state is still on disk.
    #[error("write failed, previous state kept: {0}")]
    RolledBack(String),

    /// The write failed and the previous state could not be restored.
    #[error("write failed and restore from backup failed: {0}")]
    Unrecoverable(String),
}

impl PersistenceError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, PersistenceError::Unrecoverable(_))
    }
}
