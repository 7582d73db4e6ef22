//! # Lock Safety
//!
//! - **Timeout Protection**: acquisition gives up after a deadline
//! - **Path Containment**: the lock file must resolve inside the data directory
//! - **Identity**: a lock only counts if the path still names the locked file

use std::fs::File;
use std::path::Path;
use std::time::Duration;

/// Default time to wait for another writer.
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(30);

/// True if `lock_path` resolves to a location inside `data_dir`.
pub fn validate_lock_path(data_dir: &Path, lock_path: &Path) -> bool {
    match (lock_path.canonicalize(), data_dir.canonicalize()) {
        (Ok(lock), Ok(dir)) => lock.starts_with(dir),
        _ => false,
    }
}

/// True if `path` currently names the same file as the open `file`.
#[cfg(unix)]
pub fn is_same_file(file: &File, path: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;

    match (file.metadata(), std::fs::metadata(path)) {
        (Ok(held), Ok(current)) => held.dev() == current.dev() && held.ino() == current.ino(),
        _ => false,
    }
}

#[cfg(not(unix))]
pub fn is_same_file(_file: &File, path: &Path) -> bool {
    path.exists()
}
