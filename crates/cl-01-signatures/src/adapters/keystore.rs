//! # Keystores
//!
//! `FileKeystore` follows the key-file convention of the civic application:
//! one PEM file per identity at `<keys_dir>/<identity>_private.pem`.

use crate::domain::errors::SignatureError;
use crate::domain::keys::RsaKeyPair;
use crate::ports::outbound::Keystore;
use parking_lot::RwLock;
use rsa::RsaPrivateKey;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

// =============================================================================
// FILE KEYSTORE
// =============================================================================

/// Private keys stored as PEM files in one directory.
#[derive(Debug, Clone)]
pub struct FileKeystore {
    keys_dir: PathBuf,
}

impl FileKeystore {
    const SUFFIX: &'static str = "_private.pem";

    pub fn new(keys_dir: impl Into<PathBuf>) -> Self {
        Self {
            keys_dir: keys_dir.into(),
        }
    }

    pub fn keys_dir(&self) -> &Path {
        &self.keys_dir
    }

    /// Location of the private key file for `identity`.
    ///
    /// Identities are restricted to `[A-Za-z0-9@._-]` and may not start with
    /// a dot, so the resolved path can never leave the key directory.
    pub fn key_path(&self, identity: &str) -> Result<PathBuf, SignatureError> {
        let valid = !identity.is_empty()
            && !identity.starts_with('.')
            && identity
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '@' | '.' | '_' | '-'));
        if !valid {
            return Err(SignatureError::InvalidIdentity(identity.to_string()));
        }
        Ok(self.keys_dir.join(format!("{}{}", identity, Self::SUFFIX)))
    }

    /// Write the private key of `pair` for `identity`, replacing any previous key.
    pub fn store(&self, identity: &str, pair: &RsaKeyPair) -> Result<PathBuf, SignatureError> {
        let path = self.key_path(identity)?;
        std::fs::create_dir_all(&self.keys_dir).map_err(io_error)?;
        let pem = pair.private_key_pem()?;
        std::fs::write(&path, pem.as_bytes()).map_err(io_error)?;
        restrict_permissions(&path)?;
        info!("[cl-01] 🔑 Stored private key for {} at {}", identity, path.display());
        Ok(path)
    }

    /// Whether a key file exists for `identity`.
    pub fn contains(&self, identity: &str) -> bool {
        self.key_path(identity).map(|p| p.is_file()).unwrap_or(false)
    }
}

impl Keystore for FileKeystore {
    fn private_key_for(&self, identity: &str) -> Result<RsaPrivateKey, SignatureError> {
        let path = self.key_path(identity)?;
        let pem = match std::fs::read_to_string(&path) {
            Ok(pem) => pem,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("[cl-01] No key file at {}", path.display());
                return Err(SignatureError::KeyNotFound(identity.to_string()));
            }
            Err(e) => return Err(io_error(e)),
        };
        let pair = RsaKeyPair::from_private_pem(&pem)?;
        Ok(pair.private_key().clone())
    }
}

fn io_error(e: io::Error) -> SignatureError {
    SignatureError::Io(e.to_string())
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<(), SignatureError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)).map_err(io_error)
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<(), SignatureError> {
    Ok(())
}

// =============================================================================
// IN-MEMORY KEYSTORE
// =============================================================================

/// Keystore backed by a map, for tests and embedded use.
#[derive(Default)]
pub struct InMemoryKeystore {
    keys: RwLock<HashMap<String, RsaPrivateKey>>,
}

impl InMemoryKeystore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, identity: impl Into<String>, pair: &RsaKeyPair) {
        self.keys
            .write()
            .insert(identity.into(), pair.private_key().clone());
    }

    pub fn remove(&self, identity: &str) -> bool {
        self.keys.write().remove(identity).is_some()
    }
}

impl Keystore for InMemoryKeystore {
    fn private_key_for(&self, identity: &str) -> Result<RsaPrivateKey, SignatureError> {
        self.keys
            .read()
            .get(identity)
            .cloned()
            .ok_or_else(|| SignatureError::KeyNotFound(identity.to_string()))
    }
}
