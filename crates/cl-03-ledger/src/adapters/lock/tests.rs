//! # Lock Tests

use super::security::{is_same_file, validate_lock_path};
use super::*;
use fs2::FileExt;
use std::fs::{self, OpenOptions};
use std::time::Duration;

const SHORT: Duration = Duration::from_millis(200);

#[test]
fn test_lock_acquire_creates_file() {
    let dir = tempfile::tempdir().unwrap();

    let lock = LedgerLock::acquire(dir.path()).expect("Should acquire lock");
    assert!(lock.path().exists());
    assert_eq!(lock.pid(), std::process::id());

    let content = fs::read_to_string(lock.path()).unwrap();
    assert_eq!(content.trim().parse::<u32>().unwrap(), std::process::id());
}

#[test]
fn test_second_writer_times_out() {
    let dir = tempfile::tempdir().unwrap();
    let _held = LedgerLock::acquire(dir.path()).unwrap();

    match LedgerLock::acquire_with_timeout(dir.path(), SHORT) {
        Err(LockError::AlreadyLocked { pid, .. }) => assert_eq!(pid, Some(std::process::id())),
        other => panic!("expected AlreadyLocked, got {:?}", other),
    }
}

#[test]
fn test_release_keeps_file_and_clears_pid() {
    let dir = tempfile::tempdir().unwrap();
    let lock = LedgerLock::acquire(dir.path()).unwrap();
    let path = lock.path().to_path_buf();
    drop(lock);

    assert!(path.exists());
    assert!(fs::read_to_string(&path).unwrap().is_empty());
    assert!(LedgerLock::acquire_with_timeout(dir.path(), SHORT).is_ok());
}

#[test]
fn test_waiter_from_before_release_excludes_newcomers() {
    let dir = tempfile::tempdir().unwrap();
    let first = LedgerLock::acquire(dir.path()).unwrap();

    // A second writer opened the lock file while the first still held it
    let waiter = OpenOptions::new()
        .read(true)
        .write(true)
        .open(first.path())
        .unwrap();
    drop(first);
    waiter.try_lock_exclusive().unwrap();

    assert!(matches!(
        LedgerLock::acquire_with_timeout(dir.path(), SHORT),
        Err(LockError::AlreadyLocked { .. })
    ));

    waiter.unlock().unwrap();
    assert!(LedgerLock::acquire_with_timeout(dir.path(), SHORT).is_ok());
}

#[cfg(unix)]
#[test]
fn test_replaced_lock_file_is_not_the_same_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(LedgerLock::LOCK_FILE);
    fs::write(&path, b"").unwrap();
    let held = fs::File::open(&path).unwrap();
    assert!(is_same_file(&held, &path));

    fs::remove_file(&path).unwrap();
    assert!(!is_same_file(&held, &path));

    fs::write(&path, b"").unwrap();
    assert!(!is_same_file(&held, &path));
}

#[test]
fn test_creates_missing_data_dir() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("data").join("ledger");
    let lock = LedgerLock::acquire(&nested).unwrap();
    assert!(lock.path().starts_with(&nested));
}

#[test]
fn test_validate_lock_path() {
    let dir = tempfile::tempdir().unwrap();
    let inside = dir.path().join(LedgerLock::LOCK_FILE);
    fs::write(&inside, b"1").unwrap();
    assert!(validate_lock_path(dir.path(), &inside));

    let other = tempfile::tempdir().unwrap();
    let outside = other.path().join(LedgerLock::LOCK_FILE);
    fs::write(&outside, b"1").unwrap();
    assert!(!validate_lock_path(dir.path(), &outside));
}
