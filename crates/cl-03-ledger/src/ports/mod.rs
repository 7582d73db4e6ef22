//! # Ports Layer
//!
//! - `inbound`: the API the ledger exposes
//! - `outbound`: what the host must provide (storage, content policy, clock)

pub mod inbound;
pub mod outbound;

pub use inbound::LedgerApi;
pub use outbound::{ChainPersistence, DataValidator, TimeSource};
