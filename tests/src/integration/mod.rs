//! Integration scenarios over a file-backed ledger.
//!
//! Every test builds its own temporary data directory through
//! [`fixtures::LedgerHarness`], so tests run in parallel safely.

#[cfg(test)]
mod fixtures;

#[cfg(test)]
mod concurrency;
#[cfg(test)]
mod persistence;
#[cfg(test)]
mod rollups;
#[cfg(test)]
mod scenarios;
