//! # Validator Registry Service
//!
//! Internally synchronised; share it behind an `Arc`. The registry file is
//! guarded by its own `fs2` lock file (`<registry>.lock`), independently of
//! the chain file.
//!
//! Every mutation takes that lock, re-reads the file, applies the change and
//! writes the file back, so handles in different processes never overwrite
//! each other's changes. Reads use the copy from the last open or mutation;
//! [`ValidatorRegistry::reload`] refreshes it.


use crate::domain::entry::ValidatorEntry;
use crate::domain::errors::RegistryError;
use crate::ports::ValidatorAuthority;
use cl_01_signatures::{parse_public_key_pem, PublicKeyDirectory, SignatureError};
use fs2::FileExt;
use parking_lot::RwLock;
use shared_types::{is_sentinel_signature, is_system_identity, Timestamp};
use std::ffi::OsString;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Persisted list of validator entries.
pub struct ValidatorRegistry {
    entries: RwLock<Vec<ValidatorEntry>>,
    /// `None` for a registry that is never written to disk.
    path: Option<PathBuf>,
}

impl ValidatorRegistry {
    /// Registry that lives only in memory.
    pub fn in_memory() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            path: None,
        }
    }

    /// Load the registry file at `path`; a missing file is an empty registry.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, RegistryError> {
        let path = path.into();
        let entries = read_entries(&path)?;
        info!(
            "[cl-02] Loaded {} validator entries from {}",
            entries.len(),
            path.display()
        );
        Ok(Self {
            entries: RwLock::new(entries),
            path: Some(path),
        })
    }

    /// Re-read the registry file, picking up changes made by other handles.
    pub fn reload(&self) -> Result<(), RegistryError> {
        if let Some(path) = &self.path {
            *self.entries.write() = read_entries(path)?;
        }
        Ok(())
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Register `identity` with `public_key` (PEM).
    ///
    /// Returns `Ok(false)` without touching the existing record if the
    /// identity is already present, active or not.
    pub fn add(&self, identity: &str, public_key: &str) -> Result<bool, RegistryError> {
        validate_identity(identity)?;
        parse_public_key_pem(public_key).map_err(|e| RegistryError::InvalidPublicKey {
            identity: identity.to_string(),
            reason: e.to_string(),
        })?;

        self.mutate(|entries| {
            if entries.iter().any(|entry| entry.identity == identity) {
                info!("[cl-02] Validator {} already registered, not overwriting", identity);
                return false;
            }
            entries.push(ValidatorEntry::new(identity, public_key, Timestamp::now()));
            true
        })
        .inspect(|added| {
            if *added {
                info!("[cl-02] ✓ Validator {} added", identity);
            }
        })
    }

    /// Deactivate every entry for `identity`. Returns how many were active.
    pub fn remove(&self, identity: &str) -> Result<usize, RegistryError> {
        let deactivated = self.mutate(|entries| {
            let mut deactivated = 0;
            for entry in entries.iter_mut() {
                if entry.identity == identity && entry.active {
                    entry.active = false;
                    deactivated += 1;
                }
            }
            deactivated
        })?;
        match deactivated {
            0 => warn!("[cl-02] No active validator {} to remove", identity),
            _ => info!("[cl-02] Validator {} deactivated", identity),
        }
        Ok(deactivated)
    }

    /// Apply `change` to the latest stored entries under the file lock.
    ///
    /// The file is only written if `change` reports a modification. On
    /// success the in-memory copy becomes the latest stored list either way.
    fn mutate<T, F>(&self, change: F) -> Result<T, RegistryError>
    where
        T: Modified,
        F: FnOnce(&mut Vec<ValidatorEntry>) -> T,
    {
        let _lock = self.lock_file()?;
        let mut entries = self.entries.write();
        let mut updated = match &self.path {
            Some(path) => read_entries(path)?,
            None => entries.clone(),
        };
        let result = change(&mut updated);
        if result.modified() {
            self.save(&updated)?;
        }
        *entries = updated;
        Ok(result)
    }

    /// True only if an entry for `identity` exists and is active.
    pub fn is_active_validator(&self, identity: &str) -> bool {
        self.entries
            .read()
            .iter()
            .any(|entry| entry.identity == identity && entry.active)
    }

    /// Public key of `identity`, active or not.
    pub fn public_key_of(&self, identity: &str) -> Result<String, RegistryError> {
        self.entries
            .read()
            .iter()
            .find(|entry| entry.identity == identity)
            .map(|entry| entry.public_key.clone())
            .ok_or_else(|| RegistryError::NotFound(identity.to_string()))
    }

    /// Snapshot of every entry, in registration order.
    pub fn entries(&self) -> Vec<ValidatorEntry> {
        self.entries.read().clone()
    }

    /// Identities of the currently active validators.
    pub fn active_identities(&self) -> Vec<String> {
        self.entries
            .read()
            .iter()
            .filter(|entry| entry.active)
            .map(|entry| entry.identity.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Exclusive lock held for one mutation. The lock file is never deleted.
    fn lock_file(&self) -> Result<Option<File>, RegistryError> {
        let Some(path) = &self.path else {
            return Ok(None);
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| RegistryError::Io(e.to_string()))?;
        }
        let lock_path = sibling(path, ".lock");
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .map_err(|e| RegistryError::Io(format!("{}: {}", lock_path.display(), e)))?;
        file.lock_exclusive()
            .map_err(|e| RegistryError::Io(format!("lock {}: {}", lock_path.display(), e)))?;
        debug!("[cl-02] 🔒 Registry locked");
        Ok(Some(file))
    }

    /// Write through a temp file and rename, so readers never see half a list.
    fn save(&self, entries: &[ValidatorEntry]) -> Result<(), RegistryError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let bytes = serde_json::to_vec_pretty(entries)
            .map_err(|e| RegistryError::Io(e.to_string()))?;
        let temp = sibling(path, &format!(".{}.tmp", std::process::id()));
        std::fs::write(&temp, bytes)
            .and_then(|()| std::fs::rename(&temp, path))
            .map_err(|e| {
                let _ = std::fs::remove_file(&temp);
                RegistryError::Io(format!("{}: {}", path.display(), e))
            })
    }
}

/// Whether a mutation changed anything worth writing.
trait Modified {
    fn modified(&self) -> bool;
}

impl Modified for bool {
    fn modified(&self) -> bool {
        *self
    }
}

impl Modified for usize {
    fn modified(&self) -> bool {
        *self > 0
    }
}

fn read_entries(path: &Path) -> Result<Vec<ValidatorEntry>, RegistryError> {
    match std::fs::read(path) {
        Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| RegistryError::Corrupt(e.to_string())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("[cl-02] 📁 No registry file at {}", path.display());
            Ok(Vec::new())
        }
        Err(e) => Err(RegistryError::Io(e.to_string())),
    }
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("validators"));
    name.push(suffix);
    path.with_file_name(name)
}

fn validate_identity(identity: &str) -> Result<(), RegistryError> {
    if identity.trim().is_empty()
        || identity
            .chars()
            .any(|c| c.is_whitespace() || c.is_control())
    {
        return Err(RegistryError::InvalidIdentity(identity.to_string()));
    }
    if is_system_identity(identity) || is_sentinel_signature(identity) {
        return Err(RegistryError::ReservedIdentity(identity.to_string()));
    }
    Ok(())
}

impl ValidatorAuthority for ValidatorRegistry {
    fn is_active_validator(&self, identity: &str) -> bool {
        ValidatorRegistry::is_active_validator(self, identity)
    }
}

impl PublicKeyDirectory for ValidatorRegistry {
    fn public_key_for(&self, identity: &str) -> Result<String, SignatureError> {
        self.public_key_of(identity)
            .map_err(|_| SignatureError::IdentityNotFound(identity.to_string()))
    }
}
