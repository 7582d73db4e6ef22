//! # Ports
//!
//! The authority check the ledger performs before accepting a Page.

use std::sync::Arc;

/// Answers "may this identity author a Page right now?".
pub trait ValidatorAuthority: Send + Sync {
    fn is_active_validator(&self, identity: &str) -> bool;
}

impl<T: ValidatorAuthority + ?Sized> ValidatorAuthority for Arc<T> {
    fn is_active_validator(&self, identity: &str) -> bool {
        (**self).is_active_validator(identity)
    }
}
