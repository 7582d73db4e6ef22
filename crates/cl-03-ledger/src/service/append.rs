//! # Write Path
//!
//! Page append and genesis initialisation. Callers hold the write lock.

use super::LedgerService;
use crate::domain::block::{page_signing_payload, Block, Tier};
use crate::domain::chain::ChainState;
use crate::domain::errors::AppendError;
use crate::domain::rollup;
use crate::ports::outbound::{ChainPersistence, DataValidator, TimeSource};
use chrono::{DateTime, Utc};
use serde_json::json;
use shared_types::{is_system_identity, sentinel, Hash256, Payload, Timestamp};
use tracing::{error, info, warn};

impl<P, V, T> LedgerService<P, V, T>
where
    P: ChainPersistence,
    V: DataValidator,
    T: TimeSource,
{
    pub(super) fn append_locked(
        &self,
        payload: Payload,
        author: &str,
        signature: Option<&str>,
    ) -> Result<Block, AppendError> {
        if payload.is_empty() {
            return Err(AppendError::InvalidInput("payload must be a non-empty record".into()));
        }
        if author.trim().is_empty() {
            return Err(AppendError::InvalidInput("author identity must not be empty".into()));
        }
        if signature.is_some_and(|s| s.trim().is_empty()) {
            return Err(AppendError::InvalidInput("supplied signature is empty".into()));
        }
        if !is_system_identity(author) && !self.authority.is_active_validator(author) {
            return Err(AppendError::UnknownValidator(author.to_string()));
        }

        self.content.validate(&payload).map_err(AppendError::InvalidData)?;
        let payload = self.content.sanitize(payload);

        let state = self.persistence.load()?;
        let (index, previous_hash) = state.next_link(Tier::Page);
        let now = self.clock.now();
        let timestamp = Timestamp::from_datetime(now);

        let signature = match signature {
            Some(supplied) => supplied.to_string(),
            None => self.sign_page(index, &previous_hash, &timestamp, &payload, author),
        };
        let page = Block::page(index, previous_hash, timestamp, payload, author, signature);

        // Re-read: another writer may have appended since the index was taken
        let mut state = self.persistence.load()?;
        let actual = state.len(Tier::Page) as u64;
        if page.index() != actual {
            return Err(AppendError::ConcurrencyConflict {
                expected: page.index(),
                actual,
            });
        }

        self.finish_append(&mut state, page, now)
    }

    pub(super) fn genesis_locked(&self) -> Result<Option<Block>, AppendError> {
        let mut state = self.persistence.load()?;
        if !state.pages().is_empty() {
            info!("[cl-03] Chain already initialized ({} pages)", state.len(Tier::Page));
            return Ok(None);
        }

        let now = self.clock.now();
        let timestamp = Timestamp::from_datetime(now);
        let data = genesis_record(&timestamp);
        let genesis = Block::page(0, Hash256::ZERO, timestamp, data, sentinel::GENESIS, sentinel::GENESIS);
        let genesis = self.finish_append(&mut state, genesis, now)?;
        info!("[cl-03] 🌱 Genesis page {} created", genesis.hash().short());
        Ok(Some(genesis))
    }

    /// Link, persist, then roll up.
    ///
    /// The Page is durable before the rollup runs. A failed rollup save
    /// leaves the Page appended and is only reported if it is fatal.
    fn finish_append(&self, state: &mut ChainState, page: Block, now: DateTime<Utc>) -> Result<Block, AppendError> {
        state.push(page.clone()).map_err(|source| {
            error!(
                "[cl-03] ❌ Page #{} does not link onto the chain: {}",
                page.index(),
                source
            );
            AppendError::ChainIntegrity {
                tier: Tier::Page,
                source,
            }
        })?;
        self.commit(state)?;
        info!(
            "[cl-03] 📄 Page #{} appended by {} ({})",
            page.index(),
            page.validator(),
            page.hash().short()
        );

        let outcome = rollup::run_all(state, now, &self.config.rollup);
        if !outcome.is_empty() {
            match self.commit_followup(state) {
                Ok(()) => {}
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => warn!("[cl-03] Rollup after page #{} not saved: {}", page.index(), e),
            }
        }
        Ok(page)
    }

    /// Signature for a Page the caller did not sign.
    ///
    /// System identities sign with their own name. A failed signature is
    /// stored as `UNSIGNED` and the append goes ahead.
    fn sign_page(
        &self,
        index: u64,
        previous_hash: &Hash256,
        timestamp: &Timestamp,
        payload: &Payload,
        author: &str,
    ) -> String {
        if is_system_identity(author) {
            return author.to_string();
        }
        let record = page_signing_payload(index, previous_hash, timestamp, payload, author);
        match self.signer.sign(&record, author) {
            Ok(signature) => signature,
            Err(e) => {
                warn!(
                    "[cl-03] ⚠️ Signing page #{} for {} failed ({}); storing it UNSIGNED",
                    index, author, e
                );
                sentinel::UNSIGNED.to_string()
            }
        }
    }
}

fn genesis_record(timestamp: &Timestamp) -> Payload {
    let mut record = Payload::new();
    record.insert("type".into(), json!("genesis"));
    record.insert("message".into(), json!("Civic ledger genesis"));
    record.insert("created_at".into(), json!(timestamp.as_str()));
    record
}
