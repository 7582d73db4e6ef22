//! # Adapters Module
//!
//! ## Modules
//!
//! - `storage`: atomic JSON chain file and in-memory store
//! - `lock`: process-level write lock on the data directory
//! - `content`: default content policy
//! - `time`: system clock

pub mod content;
pub mod lock;
pub mod storage;
pub mod time;

pub use content::PolicyDataValidator;
pub use lock::{LedgerLock, LockError};
pub use storage::{AtomicJsonFile, FileReplacer, InMemoryChainStore, RenameReplacer};
pub use time::SystemTimeSource;
