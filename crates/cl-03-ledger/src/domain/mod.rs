//! # Domain Layer
//!
//! Pure ledger logic with no I/O: blocks, the chain state, rollups and
//! chain validation.

pub mod block;
pub mod chain;
pub mod config;
pub mod errors;
pub mod rollup;
pub mod validation;

pub use block::{page_signing_payload, Block, BlockBody, ChildRef, Tier};
pub use chain::{
    is_valid_successor, validate_against_predecessor, ChainState, ChainSummary, LinkError,
    TierSummary,
};
pub use config::{ContentPolicy, LedgerConfig, RollupSchedule};
pub use errors::{AppendError, PersistenceError};
pub use rollup::{RollupError, RollupOutcome};
pub use validation::{validate_chain, ChainFault, ChainReport, ChainValidator};
