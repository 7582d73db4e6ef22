//! # Ledger Service
//!
//! The main service implementing [`LedgerApi`].
//!
//! ## Architecture
//!
//! This service:
//! 1. Serializes every write (append, genesis, rollup) behind one mutex
//! 2. Loads a fresh snapshot from [`ChainPersistence`] for every operation
//! 3. Signs Pages through the injected [`RecordSigner`]
//! 4. Stops accepting writes after a fatal persistence error
//!
//! Everything it talks to is injected through [`LedgerDependencies`].

mod append;
mod maintenance;
mod queries;
#[cfg(test)]
mod tests;

use crate::domain::block::{Block, Tier};
use crate::domain::chain::{ChainState, ChainSummary};
use crate::domain::config::LedgerConfig;
use crate::domain::errors::{AppendError, PersistenceError};
use crate::domain::rollup::RollupOutcome;
use crate::domain::validation::ChainReport;
use crate::ports::inbound::LedgerApi;
use crate::ports::outbound::{ChainPersistence, DataValidator, TimeSource};
use cl_01_signatures::{PublicKeyDirectory, RecordSigner};
use cl_02_validator_registry::ValidatorAuthority;
use parking_lot::Mutex;
use shared_types::{Hash256, Payload};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, warn};

/// Dependencies for [`LedgerService`].
pub struct LedgerDependencies<P, V, T> {
    pub persistence: P,
    pub content: V,
    pub clock: T,
    pub signer: Arc<dyn RecordSigner>,
    /// Decides who may author Pages.
    pub authority: Arc<dyn ValidatorAuthority>,
    /// Public keys for signature verification.
    pub directory: Arc<dyn PublicKeyDirectory>,
}

/// The ledger: block store, rollup engine and chain validator behind one API.
///
/// Internally synchronised; share it behind an `Arc`.
pub struct LedgerService<P, V, T>
where
    P: ChainPersistence,
    V: DataValidator,
    T: TimeSource,
{
    pub(crate) persistence: P,
    pub(crate) content: V,
    pub(crate) clock: T,
    pub(crate) signer: Arc<dyn RecordSigner>,
    pub(crate) authority: Arc<dyn ValidatorAuthority>,
    pub(crate) directory: Arc<dyn PublicKeyDirectory>,
    pub(crate) config: LedgerConfig,
    /// Held for the whole load-modify-save cycle of every write.
    write_lock: Mutex<()>,
    halted: AtomicBool,
}

impl<P, V, T> LedgerService<P, V, T>
where
    P: ChainPersistence,
    V: DataValidator,
    T: TimeSource,
{
    pub fn new(deps: LedgerDependencies<P, V, T>, config: LedgerConfig) -> Self {
        Self {
            persistence: deps.persistence,
            content: deps.content,
            clock: deps.clock,
            signer: deps.signer,
            authority: deps.authority,
            directory: deps.directory,
            config,
            write_lock: Mutex::new(()),
            halted: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn persistence(&self) -> &P {
        &self.persistence
    }

    /// True once a fatal persistence error has stopped all writes.
    pub fn is_halted(&self) -> bool {
        self.halted.load(Ordering::SeqCst)
    }

    fn ensure_writable(&self) -> Result<(), AppendError> {
        if self.is_halted() {
            warn!("[cl-03] Write refused: ledger is halted");
            return Err(AppendError::Halted);
        }
        Ok(())
    }

    /// Persist `state`, halting the ledger on a fatal error.
    fn commit(&self, state: &ChainState) -> Result<(), AppendError> {
        self.halt_on_fatal(self.persistence.save(state))
    }

    /// Persist rollups that extend the state just committed.
    fn commit_followup(&self, state: &ChainState) -> Result<(), AppendError> {
        self.halt_on_fatal(self.persistence.save_followup(state))
    }

    fn halt_on_fatal(&self, saved: Result<(), PersistenceError>) -> Result<(), AppendError> {
        saved.map_err(|e| {
            if e.is_fatal() {
                self.halted.store(true, Ordering::SeqCst);
                error!("[cl-03] 🚨 Fatal persistence error, halting writes: {}", e);
            }
            AppendError::from(e)
        })
    }
}

impl<P, V, T> LedgerApi for LedgerService<P, V, T>
where
    P: ChainPersistence,
    V: DataValidator,
    T: TimeSource,
{
    fn append_page(&self, payload: Payload, author: &str, signature: Option<&str>) -> Result<Block, AppendError> {
        let _guard = self.write_lock.lock();
        self.ensure_writable()?;
        self.append_locked(payload, author, signature)
            .inspect_err(|e| warn!("[cl-03] Append by {:?} rejected: {}", author, e))
    }

    fn initialize_genesis(&self) -> Result<Option<Block>, AppendError> {
        let _guard = self.write_lock.lock();
        self.ensure_writable()?;
        self.genesis_locked()
    }

    fn run_rollups(&self) -> Result<RollupOutcome, AppendError> {
        let _guard = self.write_lock.lock();
        self.ensure_writable()?;
        self.rollups_locked()
    }

    fn last_block(&self, tier: Tier) -> Result<Option<Block>, PersistenceError> {
        self.query_last_block(tier)
    }

    fn block(&self, tier: Tier, index: u64) -> Result<Option<Block>, PersistenceError> {
        self.query_block(tier, index)
    }

    fn find_page(&self, hash: &Hash256) -> Result<Option<Block>, PersistenceError> {
        self.query_find_page(hash)
    }

    fn pages_by_validator(&self, identity: &str) -> Result<Vec<Block>, PersistenceError> {
        self.query_pages_by_validator(identity)
    }

    fn summary(&self) -> Result<ChainSummary, PersistenceError> {
        Ok(self.persistence.load()?.summary())
    }

    fn snapshot(&self) -> Result<ChainState, PersistenceError> {
        self.persistence.load()
    }

    fn chain_report(&self) -> Result<ChainReport, PersistenceError> {
        self.query_chain_report()
    }

    fn validate_chain(&self) -> bool {
        self.query_validate_chain()
    }
}
