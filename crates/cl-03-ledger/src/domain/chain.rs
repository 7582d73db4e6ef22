//! # Chain State
//!
//! The five tier sequences, persisted together as one JSON document:
//!
//! ```text
//! { "pages": [...], "chapters": [...], "books": [...], "parts": [...], "series": [...] }
//! ```
//!
//! Missing tier keys load as empty sequences so older files stay readable.

use crate::domain::block::{Block, Tier};
use serde::{Deserialize, Serialize};
use shared_types::Hash256;
use thiserror::Error;

/// All five tiers of the ledger.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChainState {
    #[serde(default)]
    pages: Vec<Block>,
    #[serde(default)]
    chapters: Vec<Block>,
    #[serde(default)]
    books: Vec<Block>,
    #[serde(default)]
    parts: Vec<Block>,
    #[serde(default)]
    series: Vec<Block>,
}

impl ChainState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The sequence of `tier`.
    pub fn tier(&self, tier: Tier) -> &[Block] {
        match tier {
            Tier::Page => &self.pages,
            Tier::Chapter => &self.chapters,
            Tier::Book => &self.books,
            Tier::Part => &self.parts,
            Tier::Series => &self.series,
        }
    }

    fn tier_mut(&mut self, tier: Tier) -> &mut Vec<Block> {
        match tier {
            Tier::Page => &mut self.pages,
            Tier::Chapter => &mut self.chapters,
            Tier::Book => &mut self.books,
            Tier::Part => &mut self.parts,
            Tier::Series => &mut self.series,
        }
    }

    pub fn pages(&self) -> &[Block] {
        &self.pages
    }

    pub fn last_block(&self, tier: Tier) -> Option<&Block> {
        self.tier(tier).last()
    }

    pub fn len(&self, tier: Tier) -> usize {
        self.tier(tier).len()
    }

    pub fn is_empty(&self) -> bool {
        Tier::ALL.iter().all(|tier| self.tier(*tier).is_empty())
    }

    /// Index and previous hash the next block of `tier` must carry.
    pub fn next_link(&self, tier: Tier) -> (u64, Hash256) {
        let blocks = self.tier(tier);
        let previous_hash = blocks.last().map(|block| *block.hash()).unwrap_or(Hash256::ZERO);
        (blocks.len() as u64, previous_hash)
    }

    /// Append a block to its tier after checking it against the tail.
    pub fn push(&mut self, block: Block) -> Result<(), LinkError> {
        let tier = block.tier();
        validate_against_predecessor(&block, self.tier(tier))?;
        self.tier_mut(tier).push(block);
        Ok(())
    }

    /// Length and head hash of every tier.
    pub fn summary(&self) -> ChainSummary {
        ChainSummary {
            tiers: Tier::ALL
                .iter()
                .map(|tier| TierSummary {
                    tier: *tier,
                    length: self.len(*tier),
                    head: self.last_block(*tier).map(|block| *block.hash()),
                })
                .collect(),
        }
    }
}

/// Length and head of one tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TierSummary {
    pub tier: Tier,
    pub length: usize,
    pub head: Option<Hash256>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainSummary {
    pub tiers: Vec<TierSummary>,
}

impl ChainSummary {
    pub fn length(&self, tier: Tier) -> usize {
        self.tiers
            .iter()
            .find(|summary| summary.tier == tier)
            .map(|summary| summary.length)
            .unwrap_or(0)
    }
}

// =============================================================================
// LINK VALIDATION
// =============================================================================

/// Why a candidate block cannot follow a sequence.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkError {
    #[error("stored hash {stored} does not match recomputed {computed}")]
    HashMismatch { stored: Hash256, computed: Hash256 },

    #[error("index {actual} does not match sequence length {expected}")]
    IndexMismatch { expected: u64, actual: u64 },

    #[error("previous_hash {actual} does not match predecessor hash {expected}")]
    BrokenLink { expected: Hash256, actual: Hash256 },

    #[error("first block has previous_hash {0}, expected the zero hash")]
    BadGenesisLink(Hash256),
}

/// Check `candidate` can be appended to `preceding`.
///
/// The candidate's hash must match a fresh recomputation, its index must
/// equal `preceding.len()`, and its `previous_hash` must be the tail's hash
/// (or the zero hash for an empty sequence).
pub fn validate_against_predecessor(candidate: &Block, preceding: &[Block]) -> Result<(), LinkError> {
    let computed = candidate.recompute_hash();
    if computed != *candidate.hash() {
        return Err(LinkError::HashMismatch {
            stored: *candidate.hash(),
            computed,
        });
    }

    let expected = preceding.len() as u64;
    if candidate.index() != expected {
        return Err(LinkError::IndexMismatch {
            expected,
            actual: candidate.index(),
        });
    }

    match preceding.last() {
        Some(tail) if candidate.previous_hash() != tail.hash() => Err(LinkError::BrokenLink {
            expected: *tail.hash(),
            actual: *candidate.previous_hash(),
        }),
        None if !candidate.previous_hash().is_zero() => {
            Err(LinkError::BadGenesisLink(*candidate.previous_hash()))
        }
        _ => Ok(()),
    }
}

/// Boolean form of [`validate_against_predecessor`].
pub fn is_valid_successor(candidate: &Block, preceding: &[Block]) -> bool {
    validate_against_predecessor(candidate, preceding).is_ok()
}
