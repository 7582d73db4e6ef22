//! Test doubles and fixtures shared by unit and integration tests.

use crate::adapters::storage::{FileReplacer, InMemoryChainStore};
use crate::domain::block::{Block, Tier};
use crate::domain::chain::ChainState;
use crate::domain::errors::PersistenceError;
use crate::ports::outbound::{ChainPersistence, TimeSource};
use chrono::{DateTime, Duration, TimeZone, Utc};
use cl_01_signatures::RsaKeyPair;
use parking_lot::Mutex;
use serde_json::{json, Value};
use shared_types::{Payload, Timestamp};
use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;

/// Turn a `json!` object into a Page payload. Panics on non-objects.
pub fn payload(value: Value) -> Payload {
    match value {
        Value::Object(map) => map,
        other => panic!("payload must be a JSON object, got {}", other),
    }
}

/// One of three RSA-2048 key pairs generated once per test binary.
pub fn keypair(slot: usize) -> &'static RsaKeyPair {
    static PAIRS: OnceLock<Vec<RsaKeyPair>> = OnceLock::new();
    &PAIRS.get_or_init(|| {
        (0..3)
            .map(|_| RsaKeyPair::generate(RsaKeyPair::DEFAULT_BITS).expect("key generation"))
            .collect()
    })[slot]
}

/// A fixed point in time tests start from.
pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0)
        .single()
        .expect("valid date")
}

/// Clock that only moves when told to.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock() += by;
    }

    pub fn set(&self, to: DateTime<Utc>) {
        *self.now.lock() = to;
    }
}

impl TimeSource for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

/// In-memory store where another writer appends a Page right before the
/// `trigger_at`-th load (1-based).
pub struct RacingPersistence {
    inner: InMemoryChainStore,
    loads: AtomicUsize,
    trigger_at: usize,
}

impl RacingPersistence {
    pub fn new(initial: ChainState, trigger_at: usize) -> Self {
        Self {
            inner: InMemoryChainStore::with_state(initial),
            loads: AtomicUsize::new(0),
            trigger_at,
        }
    }

    fn interlope(&self) -> Result<(), PersistenceError> {
        let mut state = self.inner.load()?;
        let (index, previous_hash) = state.next_link(Tier::Page);
        let page = Block::page(
            index,
            previous_hash,
            Timestamp::from_datetime(epoch()),
            payload(json!({"interloper": true})),
            "SYSTEM",
            "SYSTEM",
        );
        state
            .push(page)
            .map_err(|e| PersistenceError::Corrupt(e.to_string()))?;
        self.inner.save(&state)
    }
}

impl ChainPersistence for RacingPersistence {
    fn load(&self) -> Result<ChainState, PersistenceError> {
        let load = self.loads.fetch_add(1, Ordering::SeqCst) + 1;
        if load == self.trigger_at {
            self.interlope()?;
        }
        self.inner.load()
    }

    fn save(&self, state: &ChainState) -> Result<(), PersistenceError> {
        self.inner.save(state)
    }
}

/// Store whose saves fail with a fixed error after `healthy_saves` successes.
pub struct FailingPersistence {
    inner: InMemoryChainStore,
    healthy_saves: AtomicUsize,
    error: PersistenceError,
}

impl FailingPersistence {
    pub fn new(error: PersistenceError) -> Self {
        Self::after(0, error)
    }

    pub fn after(healthy_saves: usize, error: PersistenceError) -> Self {
        Self {
            inner: InMemoryChainStore::new(),
            healthy_saves: AtomicUsize::new(healthy_saves),
            error,
        }
    }
}

impl ChainPersistence for FailingPersistence {
    fn load(&self) -> Result<ChainState, PersistenceError> {
        self.inner.load()
    }

    fn save(&self, state: &ChainState) -> Result<(), PersistenceError> {
        let healthy = self
            .healthy_saves
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if healthy {
            self.inner.save(state)
        } else {
            Err(self.error.clone())
        }
    }
}

/// Replacer that fails without touching the target.
#[derive(Debug, Default, Clone, Copy)]
pub struct FailingReplacer;

impl FileReplacer for FailingReplacer {
    fn replace(&self, _from: &Path, _to: &Path) -> io::Result<()> {
        Err(io::Error::other("injected replace failure"))
    }
}

/// Replacer that leaves a truncated target behind, as a crash mid-copy would.
#[derive(Debug, Default, Clone, Copy)]
pub struct DestructiveReplacer;

impl FileReplacer for DestructiveReplacer {
    fn replace(&self, _from: &Path, to: &Path) -> io::Result<()> {
        std::fs::write(to, b"{\"pages\": [")?;
        Err(io::Error::other("injected crash during replace"))
    }
}
