//! # Atomic JSON Chain File
//!
//! Every save rewrites the whole chain state:
//!
//! 1. Copy the current file to a timestamped `.backup` sidecar (best effort).
//! 2. Write the new state to a temp file in the same directory and fsync it.
//! 3. Rename the temp file over the chain file.
//! 4. On failure, drop the temp file. If the chain file no longer holds the
//!    previous state, restore it from the sidecar.
//! 5. Prune sidecars beyond the retention count (best effort).
//!
//! A follow-up save (rollups after a Page) still writes a sidecar for step 4
//! but deletes it once the rename succeeds, so retention counts Pages.
//!
//! The rename in step 3 goes through [`FileReplacer`] so tests can inject
//! failures at exactly that point.

use crate::domain::chain::ChainState;
use crate::domain::errors::PersistenceError;
use crate::ports::outbound::ChainPersistence;
use chrono::{DateTime, Duration, Utc};
use std::ffi::OsString;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

const BACKUP_SUFFIX: &str = ".backup";

/// Moves a finished temp file over the target path.
pub trait FileReplacer: Send + Sync {
    fn replace(&self, from: &Path, to: &Path) -> io::Result<()>;
}

/// Atomic rename within one directory.
#[derive(Debug, Default, Clone, Copy)]
pub struct RenameReplacer;

impl FileReplacer for RenameReplacer {
    fn replace(&self, from: &Path, to: &Path) -> io::Result<()> {
        std::fs::rename(from, to)
    }
}

/// Chain state stored as one pretty-printed JSON file.
pub struct AtomicJsonFile<R: FileReplacer = RenameReplacer> {
    path: PathBuf,
    backup_retention: usize,
    replacer: R,
}

impl AtomicJsonFile {
    pub fn new(path: impl Into<PathBuf>, backup_retention: usize) -> Self {
        Self::with_replacer(path, backup_retention, RenameReplacer)
    }
}

impl<R: FileReplacer> AtomicJsonFile<R> {
    pub fn with_replacer(path: impl Into<PathBuf>, backup_retention: usize, replacer: R) -> Self {
        Self {
            path: path.into(),
            backup_retention,
            replacer,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Backup sidecars of this file, oldest first.
    pub fn backups(&self) -> Vec<PathBuf> {
        let (Some(dir), Some(prefix)) = (self.dir(), self.backup_prefix()) else {
            return Vec::new();
        };
        let Ok(entries) = std::fs::read_dir(dir) else {
            return Vec::new();
        };
        let mut backups: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .filter(|entry| {
                let name = entry.file_name();
                let name = name.to_string_lossy();
                name.starts_with(&prefix) && name.ends_with(BACKUP_SUFFIX)
            })
            .map(|entry| entry.path())
            .collect();
        backups.sort();
        backups
    }

    fn dir(&self) -> Option<&Path> {
        match self.path.parent() {
            Some(parent) if parent.as_os_str().is_empty() => Some(Path::new(".")),
            other => other,
        }
    }

    fn backup_prefix(&self) -> Option<String> {
        self.path
            .file_name()
            .map(|name| format!("{}.", name.to_string_lossy()))
    }

    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_else(|| OsString::from("chain"));
        name.push(suffix);
        self.path.with_file_name(name)
    }

    fn backup_path_for(&self, instant: DateTime<Utc>) -> PathBuf {
        let mut instant = instant;
        loop {
            let candidate = self.sibling(&format!(
                ".{}{}",
                instant.format("%Y%m%dT%H%M%S%9f"),
                BACKUP_SUFFIX
            ));
            if !candidate.exists() {
                return candidate;
            }
            instant += Duration::nanoseconds(1);
        }
    }

    /// Step 1. A failed backup is logged and the save goes on without one.
    fn create_backup(&self, current: &[u8]) -> Option<PathBuf> {
        let backup = self.backup_path_for(Utc::now());
        match std::fs::write(&backup, current) {
            Ok(()) => {
                debug!("[cl-03] Backup written to {}", backup.display());
                Some(backup)
            }
            Err(e) => {
                warn!("[cl-03] ⚠️ Could not back up {}: {}", self.path.display(), e);
                None
            }
        }
    }

    /// Steps 2 and 3.
    fn write_and_replace(&self, temp: &Path, bytes: &[u8]) -> io::Result<()> {
        let mut file = File::create(temp)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        drop(file);
        self.replacer.replace(temp, &self.path)
    }

    /// Step 4: decide whether the previous state survived the failed write.
    fn recover(&self, previous: Option<&[u8]>, backup: Option<&Path>, reason: String) -> PersistenceError {
        let on_disk = std::fs::read(&self.path).ok();
        if on_disk.as_deref() == previous {
            warn!("[cl-03] Write of {} failed, previous state intact: {}", self.path.display(), reason);
            return PersistenceError::RolledBack(reason);
        }

        let Some(backup) = backup else {
            error!("[cl-03] 🚨 {} damaged and no backup to restore from", self.path.display());
            return PersistenceError::Unrecoverable(reason);
        };
        let restored = std::fs::copy(backup, &self.path)
            .ok()
            .and_then(|_| std::fs::read(&self.path).ok())
            .is_some_and(|bytes| Some(bytes.as_slice()) == previous);
        if restored {
            warn!(
                "[cl-03] Write of {} failed, restored from {}: {}",
                self.path.display(),
                backup.display(),
                reason
            );
            PersistenceError::RolledBack(reason)
        } else {
            error!(
                "[cl-03] 🚨 Restore of {} from {} failed",
                self.path.display(),
                backup.display()
            );
            PersistenceError::Unrecoverable(reason)
        }
    }

    /// Steps 1 to 5. Without `keep_backup` the sidecar is removed after a
    /// successful replace.
    fn write_state(&self, state: &ChainState, keep_backup: bool) -> Result<(), PersistenceError> {
        if let Some(dir) = self.dir() {
            std::fs::create_dir_all(dir)
                .map_err(|e| PersistenceError::RolledBack(format!("create {}: {}", dir.display(), e)))?;
        }
        let bytes = serde_json::to_vec_pretty(state)
            .map_err(|e| PersistenceError::RolledBack(format!("serialize chain: {}", e)))?;

        let previous = match std::fs::read(&self.path) {
            Ok(previous) => Some(previous),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => {
                return Err(PersistenceError::RolledBack(format!(
                    "read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };
        let backup = previous.as_deref().and_then(|current| self.create_backup(current));

        let temp = self.sibling(&format!(".{}.tmp", std::process::id()));
        if let Err(e) = self.write_and_replace(&temp, &bytes) {
            let _ = std::fs::remove_file(&temp);
            return Err(self.recover(previous.as_deref(), backup.as_deref(), e.to_string()));
        }

        if !keep_backup {
            if let Some(backup) = &backup {
                if let Err(e) = std::fs::remove_file(backup) {
                    warn!("[cl-03] Could not remove {}: {}", backup.display(), e);
                }
            }
        }
        self.prune_backups();
        info!(
            "[cl-03] 💾 Saved chain to {} ({} bytes)",
            self.path.display(),
            bytes.len()
        );
        Ok(())
    }

    /// Step 5.
    fn prune_backups(&self) {
        let backups = self.backups();
        let excess = backups.len().saturating_sub(self.backup_retention);
        for old in backups.iter().take(excess) {
            if let Err(e) = std::fs::remove_file(old) {
                warn!("[cl-03] Could not prune backup {}: {}", old.display(), e);
            }
        }
    }
}

impl<R: FileReplacer> ChainPersistence for AtomicJsonFile<R> {
    fn load(&self) -> Result<ChainState, PersistenceError> {
        match std::fs::read(&self.path) {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                PersistenceError::Corrupt(format!("{}: {}", self.path.display(), e))
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("[cl-03] 📁 No chain file at {}", self.path.display());
                Ok(ChainState::new())
            }
            Err(e) => Err(PersistenceError::Load(format!("{}: {}", self.path.display(), e))),
        }
    }

    fn save(&self, state: &ChainState) -> Result<(), PersistenceError> {
        self.write_state(state, true)
    }

    fn save_followup(&self, state: &ChainState) -> Result<(), PersistenceError> {
        self.write_state(state, false)
    }
}
