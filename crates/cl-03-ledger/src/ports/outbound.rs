//! # Outbound Ports (Driven Ports)
//!
//! Dependencies required by the ledger service.
//!
//! Production: `AtomicJsonFile`, `PolicyDataValidator`, `SystemTimeSource`
//! Testing: `InMemoryChainStore` plus the doubles in `test_utils`

use crate::domain::chain::ChainState;
use crate::domain::errors::PersistenceError;
use chrono::{DateTime, Utc};
use shared_types::Payload;
use std::sync::Arc;

/// Durable storage for the whole chain state.
///
/// `save` replaces the stored state as one unit: a reader sees either the
/// old state or the new one, never a mix.
pub trait ChainPersistence: Send + Sync {
    /// Load the stored state. Nothing stored yet is an empty chain.
    fn load(&self) -> Result<ChainState, PersistenceError>;

    /// Replace the stored state.
    ///
    /// # Errors
    /// * `PersistenceError::RolledBack` - nothing changed on disk
    /// * `PersistenceError::Unrecoverable` - stored state may be lost
    fn save(&self, state: &ChainState) -> Result<(), PersistenceError>;

    /// Replace the stored state with one that only extends the last save,
    /// such as the rollups following a Page. Stores that keep history may
    /// leave no history entry for it. Same errors as [`save`](Self::save).
    fn save_followup(&self, state: &ChainState) -> Result<(), PersistenceError> {
        self.save(state)
    }
}

/// Content policy applied to Page payloads before they are appended.
pub trait DataValidator: Send + Sync {
    /// Reject a payload, with a reason.
    fn validate(&self, payload: &Payload) -> Result<(), String>;

    /// Normalize an accepted payload.
    fn sanitize(&self, payload: Payload) -> Payload;
}

/// Abstract interface for time.
pub trait TimeSource: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

impl<T: ChainPersistence + ?Sized> ChainPersistence for Arc<T> {
    fn load(&self) -> Result<ChainState, PersistenceError> {
        (**self).load()
    }

    fn save(&self, state: &ChainState) -> Result<(), PersistenceError> {
        (**self).save(state)
    }

    fn save_followup(&self, state: &ChainState) -> Result<(), PersistenceError> {
        (**self).save_followup(state)
    }
}

impl<T: DataValidator + ?Sized> DataValidator for Arc<T> {
    fn validate(&self, payload: &Payload) -> Result<(), String> {
        (**self).validate(payload)
    }

    fn sanitize(&self, payload: Payload) -> Payload {
        (**self).sanitize(payload)
    }
}

impl<T: TimeSource + ?Sized> TimeSource for Arc<T> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}
