//! # Chain Validator
//!
//! Walks every tier of a [`ChainState`] and collects each fault it finds
//! instead of stopping at the first one. Faults are logged, never raised.
//!
//! ## Checks
//!
//! - every tier: position equals index, stored hash matches recomputation,
//!   `previous_hash` links to the predecessor (zero hash for the first block)
//! - aggregate tiers: every child reference names an existing child with the
//!   same hash
//! - Page tier: pages authored by a registered validator carry a signature
//!   that verifies against the validator's key, active or not. `UNSIGNED`
//!   counts as a fault.

use crate::domain::block::{Block, Tier};
use crate::domain::chain::ChainState;
use cl_01_signatures::{resolve_public_key, verify_record, PublicKeyDirectory};
use shared_types::{is_exempt_signature, is_system_identity, sentinel};
use std::fmt;
use tracing::{error, info};

/// One integrity problem found in the chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainFault {
    /// Block at `position` claims a different index.
    IndexGap { tier: Tier, position: usize, index: u64 },
    /// Stored hash does not match the block's fields.
    HashMismatch { tier: Tier, index: u64 },
    /// `previous_hash` does not match the predecessor's hash.
    BrokenLink { tier: Tier, index: u64 },
    /// First block of a tier does not point at the zero hash.
    BadGenesisLink { tier: Tier },
    /// Aggregate references a child that is missing or has another hash.
    DanglingReference { tier: Tier, index: u64, child_index: u64 },
    /// No public key could be resolved for the page's validator.
    MissingPublicKey { index: u64, validator: String },
    /// Page signature does not verify.
    InvalidSignature { index: u64, validator: String },
    /// Page by a registered validator that was never signed.
    Unsigned { index: u64, validator: String },
}

impl fmt::Display for ChainFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainFault::IndexGap { tier, position, index } => {
                write!(f, "{} at position {} has index {}", tier, position, index)
            }
            ChainFault::HashMismatch { tier, index } => write!(f, "{} #{}: hash mismatch", tier, index),
            ChainFault::BrokenLink { tier, index } => {
                write!(f, "{} #{}: previous_hash does not link to #{}", tier, index, index.saturating_sub(1))
            }
            ChainFault::BadGenesisLink { tier } => {
                write!(f, "first {} does not link to the zero hash", tier)
            }
            ChainFault::DanglingReference { tier, index, child_index } => write!(
                f,
                "{} #{}: reference to {} #{} does not match",
                tier,
                index,
                tier.child_tier().map(Tier::name).unwrap_or("?"),
                child_index
            ),
            ChainFault::MissingPublicKey { index, validator } => {
                write!(f, "page #{}: no public key for {}", index, validator)
            }
            ChainFault::InvalidSignature { index, validator } => {
                write!(f, "page #{}: signature by {} does not verify", index, validator)
            }
            ChainFault::Unsigned { index, validator } => {
                write!(f, "page #{}: {} page was never signed", index, validator)
            }
        }
    }
}

/// Everything found by one validation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChainReport {
    pub faults: Vec<ChainFault>,
    pub blocks_checked: usize,
    pub signatures_verified: usize,
    /// Pages skipped because of a system author or an exempt sentinel.
    pub signatures_exempt: usize,
}

impl ChainReport {
    pub fn is_valid(&self) -> bool {
        self.faults.is_empty()
    }
}

/// Validates chain state against a public key directory.
pub struct ChainValidator<'a, D: PublicKeyDirectory + ?Sized> {
    directory: &'a D,
}

impl<'a, D: PublicKeyDirectory + ?Sized> ChainValidator<'a, D> {
    pub fn new(directory: &'a D) -> Self {
        Self { directory }
    }

    pub fn validate(&self, state: &ChainState) -> ChainReport {
        let mut report = ChainReport::default();
        for tier in Tier::ALL {
            let blocks = state.tier(tier);
            report.blocks_checked += blocks.len();
            check_links(tier, blocks, &mut report.faults);
            if let Some(child_tier) = tier.child_tier() {
                check_references(tier, blocks, state.tier(child_tier), &mut report.faults);
            }
        }
        for page in state.pages() {
            self.check_signature(page, &mut report);
        }
        report
    }

    fn check_signature(&self, page: &Block, report: &mut ChainReport) {
        let validator = page.validator();
        let signature = page.signature();
        if is_system_identity(validator) || is_exempt_signature(signature) {
            report.signatures_exempt += 1;
            return;
        }
        if signature == sentinel::UNSIGNED {
            report.faults.push(ChainFault::Unsigned {
                index: page.index(),
                validator: validator.to_string(),
            });
            return;
        }

        let pem = match resolve_public_key(self.directory, validator) {
            Ok(pem) => pem,
            Err(_) => {
                report.faults.push(ChainFault::MissingPublicKey {
                    index: page.index(),
                    validator: validator.to_string(),
                });
                return;
            }
        };
        let verified = page
            .signing_payload()
            .map(|payload| verify_record(&payload, signature, &pem))
            .unwrap_or(false);
        if verified {
            report.signatures_verified += 1;
        } else {
            report.faults.push(ChainFault::InvalidSignature {
                index: page.index(),
                validator: validator.to_string(),
            });
        }
    }
}

fn check_links(tier: Tier, blocks: &[Block], faults: &mut Vec<ChainFault>) {
    for (position, block) in blocks.iter().enumerate() {
        if block.index() != position as u64 {
            faults.push(ChainFault::IndexGap {
                tier,
                position,
                index: block.index(),
            });
        }
        if !block.has_valid_hash() {
            faults.push(ChainFault::HashMismatch {
                tier,
                index: block.index(),
            });
        }
        match position.checked_sub(1).map(|previous| &blocks[previous]) {
            Some(previous) if block.previous_hash() != previous.hash() => {
                faults.push(ChainFault::BrokenLink {
                    tier,
                    index: block.index(),
                });
            }
            None if !block.previous_hash().is_zero() => {
                faults.push(ChainFault::BadGenesisLink { tier });
            }
            _ => {}
        }
    }
}

fn check_references(tier: Tier, blocks: &[Block], children: &[Block], faults: &mut Vec<ChainFault>) {
    for block in blocks {
        for child in block.children() {
            let matches = usize::try_from(child.index)
                .ok()
                .and_then(|position| children.get(position))
                .is_some_and(|stored| *stored.hash() == child.hash);
            if !matches {
                faults.push(ChainFault::DanglingReference {
                    tier,
                    index: block.index(),
                    child_index: child.index,
                });
            }
        }
    }
}

/// Validate `state` and log every fault. True only for a fault-free chain.
pub fn validate_chain<D: PublicKeyDirectory + ?Sized>(state: &ChainState, directory: &D) -> bool {
    let report = ChainValidator::new(directory).validate(state);
    for fault in &report.faults {
        error!("[cl-03] ❌ Chain fault: {}", fault);
    }
    if report.is_valid() {
        info!(
            "[cl-03] ✓ Chain valid: {} blocks, {} signatures verified, {} exempt",
            report.blocks_checked, report.signatures_verified, report.signatures_exempt
        );
    }
    report.is_valid()
}
