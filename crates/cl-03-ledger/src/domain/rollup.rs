//! # Rollup Engine
//!
//! Folds lower-tier blocks into the next tier up once the tier's last block
//! is old enough. Each aggregate tier runs the same check:
//!
//! 1. Due if the tier is empty, or `now - last.timestamp >= interval`.
//! 2. Start after the last child the tier's tail references (or at 0).
//! 3. Aggregate every child from there on; nothing to do if there are none.
//! 4. The new block takes `validator` and `signature` from its last child.
//!
//! A long quiet period followed by a burst rolls everything up in one block;
//! batches have no fixed size.
//!
//! Tiers run in order Chapter, Book, Part, Series, so a Chapter created in
//! this pass is visible to the Book check that follows.

use crate::domain::block::{Block, BlockBody, ChildRef, Tier};
use crate::domain::chain::{ChainState, LinkError};
use crate::domain::config::RollupSchedule;
use chrono::{DateTime, Utc};
use shared_types::Timestamp;
use thiserror::Error;
use tracing::{debug, info, warn};

/// A rollup check that could not run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RollupError {
    /// The tier's tail has no child references to resume from.
    #[error("{tier} tier: last block carries no child reference to resume from")]
    MissingCursor { tier: Tier },

    #[error("{tier} tier: cannot read timestamp {raw:?} of last block")]
    UnreadableTimestamp { tier: Tier, raw: String },

    #[error("{tier} tier: rollup block rejected: {source}")]
    Link {
        tier: Tier,
        #[source]
        source: LinkError,
    },
}

/// Result of one pass over the four aggregate tiers.
#[derive(Debug, Clone, Default)]
pub struct RollupOutcome {
    /// Blocks appended in this pass, in creation order.
    pub created: Vec<Block>,
    /// Tiers skipped because their state could not be read.
    pub errors: Vec<RollupError>,
}

impl RollupOutcome {
    pub fn is_empty(&self) -> bool {
        self.created.is_empty()
    }

    /// Blocks created for `tier`.
    pub fn created_in(&self, tier: Tier) -> impl Iterator<Item = &Block> {
        self.created.iter().filter(move |block| block.tier() == tier)
    }
}

/// Run every aggregate tier's rollup check against `state`.
///
/// A failing tier is recorded in the outcome and skipped; the remaining
/// tiers still run.
pub fn run_all(state: &mut ChainState, now: DateTime<Utc>, schedule: &RollupSchedule) -> RollupOutcome {
    let mut outcome = RollupOutcome::default();
    for tier in Tier::AGGREGATES {
        match roll_up(state, tier, now, schedule) {
            Ok(Some(block)) => {
                info!(
                    "[cl-03] 📚 Rolled {} {} block(s) into {} #{}",
                    block.children().len(),
                    tier.child_tier().map(Tier::name).unwrap_or("?"),
                    tier,
                    block.index()
                );
                outcome.created.push(block);
            }
            Ok(None) => {}
            Err(e) => {
                warn!("[cl-03] Rollup skipped: {}", e);
                outcome.errors.push(e);
            }
        }
    }
    outcome
}

/// Roll the children of `tier` up into one new block if the tier is due.
pub fn roll_up(
    state: &mut ChainState,
    tier: Tier,
    now: DateTime<Utc>,
    schedule: &RollupSchedule,
) -> Result<Option<Block>, RollupError> {
    let (Some(child_tier), Some(interval)) = (tier.child_tier(), schedule.interval(tier)) else {
        return Ok(None);
    };

    let start = match state.last_block(tier) {
        None => 0,
        Some(last) => {
            let since = last.timestamp().to_utc().map_err(|e| RollupError::UnreadableTimestamp {
                tier,
                raw: e.raw,
            })?;
            if now - since < interval {
                debug!("[cl-03] {} rollup not due", tier);
                return Ok(None);
            }
            last.children()
                .last()
                .map(|child| child.index + 1)
                .ok_or(RollupError::MissingCursor { tier })?
        }
    };

    let pending = usize::try_from(start)
        .ok()
        .and_then(|start| state.tier(child_tier).get(start..))
        .unwrap_or(&[]);
    let Some(newest) = pending.last() else {
        return Ok(None);
    };

    let validator = newest.validator().to_string();
    let signature = newest.signature().to_string();
    let children: Vec<ChildRef> = pending.iter().map(Block::as_child).collect();
    let Some(body) = BlockBody::aggregate(tier, children) else {
        return Ok(None);
    };

    let (index, previous_hash) = state.next_link(tier);
    let block = Block::new(
        index,
        previous_hash,
        Timestamp::from_datetime(now),
        body,
        validator,
        signature,
    );
    state
        .push(block.clone())
        .map_err(|source| RollupError::Link { tier, source })?;
    Ok(Some(block))
}
