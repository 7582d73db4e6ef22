//! File-backed ledger harness.
//!
//! `alice` and `bob` are registered validators. Only alice's private key is
//! in the keystore, so bob's unsigned appends exercise the signing fallback.

use cl_01_signatures::{InMemoryKeystore, RsaRecordSigner};
use cl_02_validator_registry::ValidatorRegistry;
use cl_03_ledger::test_utils::{epoch, keypair, payload, ManualClock};
use cl_03_ledger::{
    AtomicJsonFile, Block, FileReplacer, LedgerApi, LedgerConfig, LedgerDependencies, LedgerService,
    PolicyDataValidator, RenameReplacer,
};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

pub const ALICE: &str = "alice";
pub const BOB: &str = "bob";

pub type FileLedger<R = RenameReplacer> =
    LedgerService<AtomicJsonFile<R>, PolicyDataValidator, Arc<ManualClock>>;

pub struct LedgerHarness {
    pub dir: TempDir,
    pub ledger: Arc<FileLedger>,
    pub clock: Arc<ManualClock>,
    pub registry: Arc<ValidatorRegistry>,
    pub keystore: Arc<InMemoryKeystore>,
}

impl LedgerHarness {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let registry = Arc::new(
            ValidatorRegistry::open(dir.path().join("validators.json")).expect("registry"),
        );
        registry
            .add(ALICE, &keypair(0).public_key_pem().expect("pem"))
            .expect("register alice");
        registry
            .add(BOB, &keypair(1).public_key_pem().expect("pem"))
            .expect("register bob");

        let keystore = Arc::new(InMemoryKeystore::new());
        keystore.insert(ALICE, keypair(0));

        let clock = Arc::new(ManualClock::new(epoch()));
        let ledger = Arc::new(open_service(
            chain_config(&dir),
            &clock,
            &registry,
            &keystore,
            RenameReplacer,
        ));
        Self {
            dir,
            ledger,
            clock,
            registry,
            keystore,
        }
    }

    pub fn chain_path(&self) -> PathBuf {
        self.config().chain_file
    }

    pub fn config(&self) -> LedgerConfig {
        chain_config(&self.dir)
    }

    /// A second service over the same files, as a fresh process would see them.
    pub fn reopen(&self) -> FileLedger {
        self.open_with(RenameReplacer)
    }

    /// A service over the same files whose writes go through `replacer`.
    pub fn open_with<R: FileReplacer>(&self, replacer: R) -> FileLedger<R> {
        open_service(self.config(), &self.clock, &self.registry, &self.keystore, replacer)
    }

    pub fn append_system(&self, n: u64) -> Block {
        self.ledger
            .append_page(payload(json!({"n": n})), "SYSTEM", None)
            .expect("system append")
    }
}

fn chain_config(dir: &TempDir) -> LedgerConfig {
    LedgerConfig {
        chain_file: dir.path().join("blockchain.json"),
        ..LedgerConfig::default()
    }
}

fn open_service<R: FileReplacer>(
    config: LedgerConfig,
    clock: &Arc<ManualClock>,
    registry: &Arc<ValidatorRegistry>,
    keystore: &Arc<InMemoryKeystore>,
    replacer: R,
) -> FileLedger<R> {
    let deps = LedgerDependencies {
        persistence: AtomicJsonFile::with_replacer(&config.chain_file, config.backup_retention, replacer),
        content: PolicyDataValidator::default(),
        clock: clock.clone(),
        signer: Arc::new(RsaRecordSigner::new(keystore.clone())),
        authority: registry.clone(),
        directory: registry.clone(),
    };
    LedgerService::new(deps, config)
}
