//! # Ledger Process Locking
//!
//! Prevents two processes from writing the same chain file.
//!
//! ## Modules
//!
//! - `flock`: `LedgerLock` implementation using fs2
//! - `security`: lock timeouts, path containment and file identity

mod flock;
mod security;
#[cfg(test)]
mod tests;

pub use flock::{LedgerLock, LockError};
pub use security::DEFAULT_LOCK_TIMEOUT;
