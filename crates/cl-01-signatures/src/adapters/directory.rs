//! In-memory public key directory.

use crate::domain::errors::SignatureError;
use crate::ports::outbound::PublicKeyDirectory;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Identity -> PEM map.
#[derive(Default)]
pub struct InMemoryDirectory {
    keys: RwLock<HashMap<String, String>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, identity: impl Into<String>, public_key_pem: impl Into<String>) {
        self.keys
            .write()
            .insert(identity.into(), public_key_pem.into());
    }
}

impl PublicKeyDirectory for InMemoryDirectory {
    fn public_key_for(&self, identity: &str) -> Result<String, SignatureError> {
        self.keys
            .read()
            .get(identity)
            .cloned()
            .ok_or_else(|| SignatureError::IdentityNotFound(identity.to_string()))
    }
}
