//! # Domain Layer
//!
//! Registry entries and errors.

pub mod entry;
pub mod errors;
