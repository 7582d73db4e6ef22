//! Ledger configuration.

use crate::domain::block::Tier;
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the ledger service and its file store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Path of the chain file.
    pub chain_file: PathBuf,
    /// Number of `.backup` sidecars kept next to the chain file.
    pub backup_retention: usize,
    pub rollup: RollupSchedule,
    pub content: ContentPolicy,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            chain_file: PathBuf::from("blockchain.json"),
            backup_retention: 5,
            rollup: RollupSchedule::default(),
            content: ContentPolicy::default(),
        }
    }
}

/// Minimum age of a tier's last block before the next rollup, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RollupSchedule {
    pub chapter_secs: i64,
    pub book_secs: i64,
    pub part_secs: i64,
    pub series_secs: i64,
}

impl Default for RollupSchedule {
    fn default() -> Self {
        const DAY: i64 = 24 * 60 * 60;
        Self {
            chapter_secs: DAY,
            book_secs: 30 * DAY,
            part_secs: 365 * DAY,
            series_secs: 3650 * DAY,
        }
    }
}

impl RollupSchedule {
    /// Interval for an aggregate tier; `None` for Pages.
    pub fn interval(&self, tier: Tier) -> Option<Duration> {
        let secs = match tier {
            Tier::Page => return None,
            Tier::Chapter => self.chapter_secs,
            Tier::Book => self.book_secs,
            Tier::Part => self.part_secs,
            Tier::Series => self.series_secs,
        };
        Some(Duration::seconds(secs))
    }
}

/// Limits enforced on Page payloads by the default content policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentPolicy {
    /// Maximum size of the encoded payload.
    pub max_payload_bytes: usize,
    /// Maximum nesting depth of objects and arrays.
    pub max_depth: usize,
    /// Keys that may not appear anywhere in a payload (case-insensitive).
    pub forbidden_keys: Vec<String>,
}

impl Default for ContentPolicy {
    fn default() -> Self {
        Self {
            max_payload_bytes: 64 * 1024,
            max_depth: 16,
            forbidden_keys: vec![
                "password".to_string(),
                "private_key".to_string(),
                "secret".to_string(),
            ],
        }
    }
}
