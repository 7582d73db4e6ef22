//! # Ledger Container
//!
//! Builds every subsystem from a [`RuntimeConfig`] and wires them together:
//!
//! ```text
//! FileKeystore ──→ RsaRecordSigner ──┐
//!                                     ├──→ LedgerService ──→ AtomicJsonFile
//! ValidatorRegistry ─────────────────┘   (authority + public keys)
//! ```

use crate::config::RuntimeConfig;
use cl_01_signatures::{FileKeystore, RsaRecordSigner};
use cl_02_validator_registry::{RegistryError, ValidatorRegistry};
use cl_03_ledger::{
    AtomicJsonFile, LedgerDependencies, LedgerService, PolicyDataValidator, SystemTimeSource,
};
use std::sync::Arc;
use tracing::info;

/// The ledger service as the runtime uses it.
pub type FileLedger = LedgerService<AtomicJsonFile, PolicyDataValidator, SystemTimeSource>;

/// All initialized subsystems.
pub struct LedgerContainer {
    pub config: RuntimeConfig,
    pub registry: Arc<ValidatorRegistry>,
    pub keystore: Arc<FileKeystore>,
    pub ledger: FileLedger,
}

impl LedgerContainer {
    /// Open the registry and wire the ledger service.
    ///
    /// Nothing is written until a command asks for it.
    pub fn open(config: RuntimeConfig) -> Result<Self, RegistryError> {
        let registry = Arc::new(ValidatorRegistry::open(config.registry_path())?);
        let keystore = Arc::new(FileKeystore::new(config.keys_dir()));
        let ledger_config = config.ledger_config();

        let deps = LedgerDependencies {
            persistence: AtomicJsonFile::new(&ledger_config.chain_file, ledger_config.backup_retention),
            content: PolicyDataValidator::new(ledger_config.content.clone()),
            clock: SystemTimeSource,
            signer: Arc::new(RsaRecordSigner::new(keystore.clone())),
            authority: registry.clone(),
            directory: registry.clone(),
        };
        info!(
            "Ledger ready: chain {}, registry {}, keys {}",
            config.chain_path().display(),
            config.registry_path().display(),
            config.keys_dir().display()
        );

        Ok(Self {
            ledger: LedgerService::new(deps, ledger_config),
            config,
            registry,
            keystore,
        })
    }
}
