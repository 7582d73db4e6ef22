//! # Operator Commands
//!
//! What each `civic-ledger` subcommand does, separated from argument
//! parsing so the flows can be tested against a temporary data directory.

use crate::container::LedgerContainer;
use anyhow::{bail, Context, Result};
use cl_01_signatures::RsaKeyPair;
use cl_03_ledger::{Block, LedgerApi, LedgerLock, Tier};
use serde_json::Value;
use shared_types::Payload;
use std::path::PathBuf;

/// Result of `keygen`.
#[derive(Debug)]
pub struct GeneratedKey {
    pub private_key_path: PathBuf,
    pub public_key_pem: String,
    /// Whether the identity was newly added to the registry.
    pub registered: bool,
}

/// Take the data directory's write lock for the duration of a command.
pub fn lock(container: &LedgerContainer) -> Result<LedgerLock> {
    LedgerLock::acquire(&container.config.data_dir).context("ledger is locked by another process")
}

/// Generate a key pair for `identity` and store the private key.
///
/// With `register`, the public key is also added to the validator registry.
pub fn keygen(container: &LedgerContainer, identity: &str, register: bool) -> Result<GeneratedKey> {
    if container.keystore.contains(identity) {
        bail!("a private key for {} already exists", identity);
    }
    let pair = RsaKeyPair::generate(RsaKeyPair::DEFAULT_BITS).context("key generation failed")?;
    let public_key_pem = pair.public_key_pem()?;
    let private_key_path = container.keystore.store(identity, &pair)?;

    let registered = if register {
        container.registry.add(identity, &public_key_pem)?
    } else {
        false
    };
    Ok(GeneratedKey {
        private_key_path,
        public_key_pem,
        registered,
    })
}

/// Parse the record argument of `append`.
pub fn parse_record(raw: &str) -> Result<Payload> {
    match serde_json::from_str::<Value>(raw).context("record is not valid JSON")? {
        Value::Object(map) => Ok(map),
        other => bail!("record must be a JSON object, got {}", other),
    }
}

pub fn append(container: &LedgerContainer, identity: &str, record: &str, signature: Option<&str>) -> Result<Block> {
    let payload = parse_record(record)?;
    let _lock = lock(container)?;
    Ok(container.ledger.append_page(payload, identity, signature)?)
}

/// Blocks of `tier`, or only the one at `index`.
pub fn show(container: &LedgerContainer, tier: Tier, index: Option<u64>) -> Result<Vec<Block>> {
    match index {
        Some(index) => Ok(container.ledger.block(tier, index)?.into_iter().collect()),
        None => Ok(container.ledger.snapshot()?.tier(tier).to_vec()),
    }
}
