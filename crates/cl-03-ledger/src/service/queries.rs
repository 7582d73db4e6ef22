//! Read operations. Each one loads its own snapshot; none take the write lock.

use super::LedgerService;
use crate::domain::block::{Block, Tier};
use crate::domain::errors::PersistenceError;
use crate::domain::validation::{validate_chain, ChainReport, ChainValidator};
use crate::ports::outbound::{ChainPersistence, DataValidator, TimeSource};
use shared_types::Hash256;
use tracing::error;

impl<P, V, T> LedgerService<P, V, T>
where
    P: ChainPersistence,
    V: DataValidator,
    T: TimeSource,
{
    pub(super) fn query_last_block(&self, tier: Tier) -> Result<Option<Block>, PersistenceError> {
        Ok(self.persistence.load()?.last_block(tier).cloned())
    }

    pub(super) fn query_block(&self, tier: Tier, index: u64) -> Result<Option<Block>, PersistenceError> {
        let state = self.persistence.load()?;
        Ok(usize::try_from(index)
            .ok()
            .and_then(|position| state.tier(tier).get(position))
            .cloned())
    }

    pub(super) fn query_find_page(&self, hash: &Hash256) -> Result<Option<Block>, PersistenceError> {
        let state = self.persistence.load()?;
        Ok(state.pages().iter().find(|page| page.hash() == hash).cloned())
    }

    pub(super) fn query_pages_by_validator(&self, identity: &str) -> Result<Vec<Block>, PersistenceError> {
        let state = self.persistence.load()?;
        Ok(state
            .pages()
            .iter()
            .filter(|page| page.validator() == identity)
            .cloned()
            .collect())
    }

    pub(super) fn query_chain_report(&self) -> Result<ChainReport, PersistenceError> {
        let state = self.persistence.load()?;
        Ok(ChainValidator::new(self.directory.as_ref()).validate(&state))
    }

    pub(super) fn query_validate_chain(&self) -> bool {
        match self.persistence.load() {
            Ok(state) => validate_chain(&state, self.directory.as_ref()),
            Err(e) => {
                error!("[cl-03] ❌ Cannot validate chain: {}", e);
                false
            }
        }
    }
}
