use crate::domain::chain::ChainState;
use crate::domain::errors::PersistenceError;
use crate::ports::outbound::ChainPersistence;
use parking_lot::RwLock;

/// In-memory chain store for testing and embedding.
#[derive(Default)]
pub struct InMemoryChainStore {
    state: RwLock<ChainState>,
}

impl InMemoryChainStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with `state`.
    pub fn with_state(state: ChainState) -> Self {
        Self {
            state: RwLock::new(state),
        }
    }
}

impl ChainPersistence for InMemoryChainStore {
    fn load(&self) -> Result<ChainState, PersistenceError> {
        Ok(self.state.read().clone())
    }

    fn save(&self, state: &ChainState) -> Result<(), PersistenceError> {
        *self.state.write() = state.clone();
        Ok(())
    }
}
