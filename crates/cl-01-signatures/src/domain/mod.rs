//! # Domain Layer
//!
//! Pure cryptographic logic with no I/O dependencies.

pub mod errors;
pub mod keys;
pub mod pkcs1;
