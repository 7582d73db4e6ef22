//! # Runtime Configuration
//!
//! Loaded in three layers, later layers winning:
//!
//! 1. Built-in defaults
//! 2. An optional JSON config file
//! 3. Environment overrides (`CIVIC_LEDGER_DATA_DIR`, `CIVIC_LEDGER_KEYS_DIR`,
//!    `CIVIC_LEDGER_LOG`)

use cl_03_ledger::{ContentPolicy, LedgerConfig, RollupSchedule};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

pub const ENV_DATA_DIR: &str = "CIVIC_LEDGER_DATA_DIR";
pub const ENV_KEYS_DIR: &str = "CIVIC_LEDGER_KEYS_DIR";
pub const ENV_LOG: &str = "CIVIC_LEDGER_LOG";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Complete runtime configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Directory holding the chain file, registry file and lock.
    pub data_dir: PathBuf,
    /// Chain file name inside `data_dir`.
    pub chain_file: String,
    /// Validator registry file name inside `data_dir`.
    pub registry_file: String,
    /// Private key directory; `<data_dir>/keys` when unset.
    pub keys_dir: Option<PathBuf>,
    /// Log filter directive, used when `RUST_LOG` is not set.
    pub log: String,
    pub backup_retention: usize,
    pub rollup: RollupSchedule,
    pub content: ContentPolicy,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        let ledger = LedgerConfig::default();
        Self {
            data_dir: PathBuf::from("data"),
            chain_file: "blockchain.json".to_string(),
            registry_file: "validators.json".to_string(),
            keys_dir: None,
            log: "info".to_string(),
            backup_retention: ledger.backup_retention,
            rollup: ledger.rollup,
            content: ledger.content,
        }
    }
}

impl RuntimeConfig {
    /// Defaults, then `file` if given, then the process environment.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = serde_json::from_slice(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Apply environment overrides read through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(ENV_DATA_DIR).filter(|v| !v.is_empty()) {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup(ENV_KEYS_DIR).filter(|v| !v.is_empty()) {
            self.keys_dir = Some(PathBuf::from(dir));
        }
        if let Some(filter) = lookup(ENV_LOG).filter(|v| !v.is_empty()) {
            self.log = filter;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, file) in [("chain_file", &self.chain_file), ("registry_file", &self.registry_file)] {
            if file.trim().is_empty() || file.contains(['/', '\\']) {
                return Err(ConfigError::Invalid(format!(
                    "{} must be a plain file name, got {:?}",
                    name, file
                )));
            }
        }
        if self.chain_file == self.registry_file {
            return Err(ConfigError::Invalid(
                "chain_file and registry_file must differ".to_string(),
            ));
        }
        Ok(())
    }

    pub fn chain_path(&self) -> PathBuf {
        self.data_dir.join(&self.chain_file)
    }

    pub fn registry_path(&self) -> PathBuf {
        self.data_dir.join(&self.registry_file)
    }

    pub fn keys_dir(&self) -> PathBuf {
        self.keys_dir
            .clone()
            .unwrap_or_else(|| self.data_dir.join("keys"))
    }

    /// Configuration for the ledger service.
    pub fn ledger_config(&self) -> LedgerConfig {
        LedgerConfig {
            chain_file: self.chain_path(),
            backup_retention: self.backup_retention,
            rollup: self.rollup,
            content: self.content.clone(),
        }
    }
}
