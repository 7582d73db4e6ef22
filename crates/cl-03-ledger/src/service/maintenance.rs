use super::LedgerService;
use crate::domain::errors::AppendError;
use crate::domain::rollup::{self, RollupOutcome};
use crate::ports::outbound::{ChainPersistence, DataValidator, TimeSource};
use tracing::debug;

impl<P, V, T> LedgerService<P, V, T>
where
    P: ChainPersistence,
    V: DataValidator,
    T: TimeSource,
{
    /// Rollup pass without a new Page; saves only if a block was created.
    pub(super) fn rollups_locked(&self) -> Result<RollupOutcome, AppendError> {
        let mut state = self.persistence.load()?;
        let outcome = rollup::run_all(&mut state, self.clock.now(), &self.config.rollup);
        if outcome.is_empty() {
            debug!("[cl-03] No rollup due");
            return Ok(outcome);
        }
        self.commit(&state)?;
        Ok(outcome)
    }
}
