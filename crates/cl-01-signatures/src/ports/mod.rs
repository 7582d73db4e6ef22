//! # Ports Layer
//!
//! Trait definitions for the hexagonal architecture.
//! - **Inbound (Driving)**: API that the ledger calls to sign records
//! - **Outbound (Driven)**: identity/key resolution this subsystem needs

pub mod inbound;
pub mod outbound;
