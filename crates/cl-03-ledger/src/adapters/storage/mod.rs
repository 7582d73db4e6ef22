//! Storage Adapters
//!
//! Implementations of the `ChainPersistence` trait.

mod file;
mod memory;

pub use file::{AtomicJsonFile, FileReplacer, RenameReplacer};
pub use memory::InMemoryChainStore;
