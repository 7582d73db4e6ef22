//! # Ledger Lock
//!
//! An `fs2` exclusive lock on `<data_dir>/ledger.lock`, holding the writer's
//! PID for diagnostics.
//!
//! The lock file is created once and never deleted. Releasing the lock only
//! unlocks it, so every writer, including one that opened the file before the
//! previous holder let go, contends for the same inode. The kernel releases
//! the lock of a process that dies, so no stale-lock cleanup exists.

use super::security::{is_same_file, validate_lock_path, DEFAULT_LOCK_TIMEOUT};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, warn};

const FIRST_RETRY: Duration = Duration::from_millis(50);
const MAX_RETRY: Duration = Duration::from_millis(500);

/// Errors from ledger locking.
#[derive(Debug, Error)]
pub enum LockError {
    #[error("Failed to create lock file: {0}")]
    CreateFailed(#[source] io::Error),

    #[error("Failed to lock {}: {source}", .path.display())]
    LockFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Ledger already in use{} ({})", .pid.map(|p| format!(" by process {}", p)).unwrap_or_default(), .path.display())]
    AlreadyLocked { pid: Option<u32>, path: PathBuf },

    #[error("Failed to write PID to lock file: {0}")]
    WriteFailed(#[source] io::Error),
}

/// Exclusive write lock on a ledger data directory.
///
/// Released on drop.
///
/// # Example
///
/// ```ignore
/// let lock = LedgerLock::acquire(Path::new("/var/lib/civic-ledger"))?;
/// service.append_page(payload, "alice@example.org", None)?;
/// drop(lock);
/// ```
#[derive(Debug)]
pub struct LedgerLock {
    file: File,
    path: PathBuf,
    pid: u32,
}

impl LedgerLock {
    pub const LOCK_FILE: &'static str = "ledger.lock";

    /// Acquire the lock, waiting up to [`DEFAULT_LOCK_TIMEOUT`].
    pub fn acquire(data_dir: &Path) -> Result<Self, LockError> {
        Self::acquire_with_timeout(data_dir, DEFAULT_LOCK_TIMEOUT)
    }

    /// Acquire the lock, polling with doubling delays until `timeout`.
    ///
    /// # Errors
    ///
    /// `LockError::AlreadyLocked` if another writer still holds the lock
    /// when the timeout expires.
    pub fn acquire_with_timeout(data_dir: &Path, timeout: Duration) -> Result<Self, LockError> {
        std::fs::create_dir_all(data_dir).map_err(LockError::CreateFailed)?;
        let path = data_dir.join(Self::LOCK_FILE);
        let deadline = Instant::now() + timeout;
        let mut delay = FIRST_RETRY;

        loop {
            if let Some(lock) = Self::try_acquire(data_dir, &path)? {
                return Ok(lock);
            }
            let now = Instant::now();
            if now >= deadline {
                return Err(LockError::AlreadyLocked {
                    pid: read_holder_pid(&path),
                    path,
                });
            }
            debug!("[cl-03] Waiting for {}", path.display());
            std::thread::sleep(delay.min(deadline - now));
            delay = (delay * 2).min(MAX_RETRY);
        }
    }

    /// One attempt; `Ok(None)` while someone else holds the lock.
    fn try_acquire(data_dir: &Path, path: &Path) -> Result<Option<Self>, LockError> {
        let mut file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(path)
            .map_err(LockError::CreateFailed)?;
        if !validate_lock_path(data_dir, path) {
            return Err(LockError::CreateFailed(io::Error::new(
                io::ErrorKind::InvalidInput,
                "Lock path escapes data directory",
            )));
        }

        match file.try_lock_exclusive() {
            Ok(()) => {}
            Err(e) if e.kind() == fs2::lock_contended_error().kind() => return Ok(None),
            Err(source) => {
                return Err(LockError::LockFailed {
                    path: path.to_path_buf(),
                    source,
                })
            }
        }

        // Someone replaced the file between our open and our lock
        if !is_same_file(&file, path) {
            warn!("[cl-03] {} was replaced while locking, retrying", path.display());
            return Ok(None);
        }

        let pid = std::process::id();
        file.set_len(0).map_err(LockError::WriteFailed)?;
        writeln!(file, "{}", pid).map_err(LockError::WriteFailed)?;
        file.sync_all().map_err(LockError::WriteFailed)?;
        debug!("[cl-03] 🔒 Lock acquired at {}", path.display());

        Ok(Some(Self {
            file,
            path: path.to_path_buf(),
            pid,
        }))
    }

    /// PID of the process holding the lock.
    pub fn pid(&self) -> u32 {
        self.pid
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// PID recorded by the current holder, if any.
fn read_holder_pid(path: &Path) -> Option<u32> {
    std::fs::read_to_string(path)
        .ok()
        .and_then(|s| s.trim().parse().ok())
}

impl Drop for LedgerLock {
    fn drop(&mut self) {
        let _ = self.file.set_len(0);
        #[allow(clippy::incompatible_msrv)]
        let _ = self.file.unlock();
        debug!("[cl-03] 🔓 Lock released at {}", self.path.display());
    }
}
