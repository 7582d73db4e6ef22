//! # Civic Ledger Runtime
//!
//! Configuration, logging and wiring for the `civic-ledger` operator binary.
//!
//! ## Modules
//!
//! - `config/` - layered runtime configuration
//! - `container/` - subsystem construction and dependency injection
//! - `commands/` - the flows behind each subcommand
//!
//! ## Startup Sequence
//!
//! 1. Load configuration (defaults, file, environment)
//! 2. Install the log subscriber
//! 3. Open the validator registry and wire the ledger service
//! 4. Take the data directory lock for write commands
//! 5. Run the command

pub mod commands;
pub mod config;
pub mod container;

pub use config::{ConfigError, RuntimeConfig};
pub use container::{FileLedger, LedgerContainer};
