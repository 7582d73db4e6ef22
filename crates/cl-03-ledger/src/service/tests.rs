//! # Ledger Service Tests

use super::*;
use crate::adapters::{InMemoryChainStore, PolicyDataValidator};
use crate::domain::validation::ChainFault;
use crate::test_utils::{epoch, keypair, payload, FailingPersistence, ManualClock, RacingPersistence};
use chrono::Duration;
use cl_01_signatures::{verify_record, InMemoryKeystore, RsaRecordSigner};
use cl_02_validator_registry::ValidatorRegistry;
use serde_json::json;

struct Harness<P: ChainPersistence> {
    service: LedgerService<P, PolicyDataValidator, Arc<ManualClock>>,
    clock: Arc<ManualClock>,
    registry: Arc<ValidatorRegistry>,
}

/// alice and bob are registered; only alice's private key is in the keystore.
fn make_test_service_with<P: ChainPersistence>(persistence: P) -> Harness<P> {
    let registry = Arc::new(ValidatorRegistry::in_memory());
    registry.add("alice", &keypair(0).public_key_pem().unwrap()).unwrap();
    registry.add("bob", &keypair(1).public_key_pem().unwrap()).unwrap();

    let keystore = InMemoryKeystore::new();
    keystore.insert("alice", keypair(0));

    let clock = Arc::new(ManualClock::new(epoch()));
    let deps = LedgerDependencies {
        persistence,
        content: PolicyDataValidator::default(),
        clock: clock.clone(),
        signer: Arc::new(RsaRecordSigner::new(keystore)),
        authority: registry.clone(),
        directory: registry.clone(),
    };
    Harness {
        service: LedgerService::new(deps, LedgerConfig::default()),
        clock,
        registry,
    }
}

fn make_test_service() -> Harness<Arc<InMemoryChainStore>> {
    make_test_service_with(Arc::new(InMemoryChainStore::new()))
}

#[test]
fn test_system_pages_chain_and_validate() {
    let h = make_test_service();

    let first = h.service.append_page(payload(json!({"x": 1})), "SYSTEM", None).unwrap();
    let second = h.service.append_page(payload(json!({"x": 1})), "SYSTEM", None).unwrap();

    assert_eq!((first.index(), second.index()), (0, 1));
    assert_eq!(first.signature(), "SYSTEM");
    assert_eq!(second.signature(), "SYSTEM");
    assert!(first.previous_hash().is_zero());
    assert_eq!(second.previous_hash(), first.hash());
    assert!(h.service.validate_chain());
}

#[test]
fn test_validator_page_is_signed() {
    let h = make_test_service();

    let page = h.service.append_page(payload(json!({"action": "vote"})), "alice", None).unwrap();

    assert_ne!(page.signature(), "UNSIGNED");
    let pem = keypair(0).public_key_pem().unwrap();
    assert!(verify_record(&page.signing_payload().unwrap(), page.signature(), &pem));
    assert!(h.service.validate_chain());
}

#[test]
fn test_signing_failure_stores_unsigned_page() {
    let h = make_test_service();

    let page = h.service.append_page(payload(json!({"action": "vote"})), "bob", None).unwrap();

    assert_eq!(page.signature(), "UNSIGNED");
    assert_eq!(h.service.snapshot().unwrap().len(Tier::Page), 1);
    let report = h.service.chain_report().unwrap();
    assert_eq!(
        report.faults,
        vec![ChainFault::Unsigned {
            index: 0,
            validator: "bob".to_string()
        }]
    );
    assert!(!h.service.validate_chain());
}

#[test]
fn test_supplied_signature_is_stored_verbatim() {
    let h = make_test_service();
    let page = h
        .service
        .append_page(payload(json!({"action": "vote"})), "bob", Some("c2lnbmF0dXJl"))
        .unwrap();
    assert_eq!(page.signature(), "c2lnbmF0dXJl");
    // Not bob's signature over this page
    assert!(!h.service.validate_chain());
}

#[test]
fn test_invalid_input_rejected_before_io() {
    let h = make_test_service();

    assert!(matches!(
        h.service.append_page(Payload::new(), "SYSTEM", None),
        Err(AppendError::InvalidInput(_))
    ));
    assert!(matches!(
        h.service.append_page(payload(json!({"x": 1})), "  ", None),
        Err(AppendError::InvalidInput(_))
    ));
    assert!(matches!(
        h.service.append_page(payload(json!({"x": 1})), "alice", Some("")),
        Err(AppendError::InvalidInput(_))
    ));
    assert!(h.service.snapshot().unwrap().is_empty());
}

#[test]
fn test_unknown_and_removed_validators_rejected() {
    let h = make_test_service();

    assert_eq!(
        h.service.append_page(payload(json!({"x": 1})), "mallory", None),
        Err(AppendError::UnknownValidator("mallory".to_string()))
    );

    h.service.append_page(payload(json!({"x": 1})), "alice", None).unwrap();
    h.registry.remove("alice").unwrap();
    assert!(matches!(
        h.service.append_page(payload(json!({"x": 2})), "alice", None),
        Err(AppendError::UnknownValidator(_))
    ));
    // Pages signed while alice was active still verify
    assert!(h.service.validate_chain());
}

#[test]
fn test_content_policy_rejects_and_sanitizes() {
    let h = make_test_service();

    assert!(matches!(
        h.service.append_page(payload(json!({"password": "hunter2"})), "SYSTEM", None),
        Err(AppendError::InvalidData(_))
    ));

    let page = h
        .service
        .append_page(payload(json!({"title": "  budget hearing "})), "SYSTEM", None)
        .unwrap();
    assert_eq!(page.data().unwrap()["title"], "budget hearing");
}

#[test]
fn test_concurrent_append_detected() {
    let h = make_test_service_with(RacingPersistence::new(ChainState::new(), 2));

    let err = h.service.append_page(payload(json!({"x": 1})), "SYSTEM", None).unwrap_err();
    assert_eq!(err, AppendError::ConcurrencyConflict { expected: 0, actual: 1 });

    let state = h.service.snapshot().unwrap();
    assert_eq!(state.len(Tier::Page), 1);
    assert_eq!(state.pages()[0].data().unwrap()["interloper"], true);
}

#[test]
fn test_rollups_follow_page_appends() {
    let h = make_test_service();

    h.service.append_page(payload(json!({"n": 0})), "SYSTEM", None).unwrap();
    let summary = h.service.summary().unwrap();
    for tier in Tier::ALL {
        assert_eq!(summary.length(tier), 1, "{} tier", tier);
    }

    h.clock.advance(Duration::hours(1));
    h.service.append_page(payload(json!({"n": 1})), "SYSTEM", None).unwrap();
    assert_eq!(h.service.summary().unwrap().length(Tier::Chapter), 1);

    h.clock.advance(Duration::hours(24));
    h.service.append_page(payload(json!({"n": 2})), "alice", None).unwrap();
    let chapter = h.service.last_block(Tier::Chapter).unwrap().unwrap();
    assert_eq!(chapter.index(), 1);
    assert_eq!(chapter.children().iter().map(|c| c.index).collect::<Vec<_>>(), vec![1, 2]);
    assert_eq!(chapter.validator(), "alice");
    assert!(h.service.validate_chain());
}

#[test]
fn test_run_rollups_is_idempotent() {
    let h = make_test_service();
    h.service.append_page(payload(json!({"n": 0})), "SYSTEM", None).unwrap();
    h.clock.advance(Duration::hours(2));
    h.service.append_page(payload(json!({"n": 1})), "SYSTEM", None).unwrap();

    h.clock.advance(Duration::hours(23));
    let first = h.service.run_rollups().unwrap();
    assert_eq!(first.created_in(Tier::Chapter).count(), 1);
    let second = h.service.run_rollups().unwrap();
    assert!(second.is_empty());
    assert_eq!(h.service.summary().unwrap().length(Tier::Chapter), 2);
}

#[test]
fn test_genesis_only_on_empty_chain() {
    let h = make_test_service();

    let genesis = h.service.initialize_genesis().unwrap().unwrap();
    assert_eq!(genesis.index(), 0);
    assert_eq!(genesis.validator(), "GENESIS");
    assert_eq!(genesis.signature(), "GENESIS");
    assert_eq!(genesis.data().unwrap()["type"], "genesis");

    assert_eq!(h.service.initialize_genesis().unwrap(), None);
    let next = h.service.append_page(payload(json!({"x": 1})), "SYSTEM", None).unwrap();
    assert_eq!(next.index(), 1);
    assert!(h.service.validate_chain());
}

#[test]
fn test_fatal_persistence_error_halts_writes() {
    let h = make_test_service_with(FailingPersistence::new(PersistenceError::Unrecoverable(
        "disk gone".into(),
    )));

    let err = h.service.append_page(payload(json!({"x": 1})), "SYSTEM", None).unwrap_err();
    assert!(err.is_fatal());
    assert!(h.service.is_halted());

    assert_eq!(
        h.service.append_page(payload(json!({"x": 2})), "SYSTEM", None),
        Err(AppendError::Halted)
    );
    assert_eq!(h.service.run_rollups().unwrap_err(), AppendError::Halted);
    assert_eq!(h.service.initialize_genesis().unwrap_err(), AppendError::Halted);
}

#[test]
fn test_rolled_back_write_does_not_halt() {
    let h = make_test_service_with(FailingPersistence::new(PersistenceError::RolledBack("busy".into())));

    let err = h.service.append_page(payload(json!({"x": 1})), "SYSTEM", None).unwrap_err();
    assert_eq!(err, AppendError::Persistence(PersistenceError::RolledBack("busy".into())));
    assert!(!h.service.is_halted());
    assert!(h.service.snapshot().unwrap().is_empty());
}

#[test]
fn test_failed_rollup_save_keeps_page() {
    let h = make_test_service_with(FailingPersistence::after(
        1,
        PersistenceError::RolledBack("busy".into()),
    ));

    let page = h.service.append_page(payload(json!({"x": 1})), "SYSTEM", None).unwrap();
    let state = h.service.snapshot().unwrap();
    assert_eq!(state.pages(), &[page]);
    assert_eq!(state.len(Tier::Chapter), 0);
}

#[test]
fn test_queries() {
    let h = make_test_service();
    let system = h.service.append_page(payload(json!({"n": 0})), "SYSTEM", None).unwrap();
    let alice = h.service.append_page(payload(json!({"n": 1})), "alice", None).unwrap();
    h.service.append_page(payload(json!({"n": 2})), "alice", None).unwrap();

    assert_eq!(h.service.last_block(Tier::Page).unwrap().unwrap().index(), 2);
    assert_eq!(h.service.block(Tier::Page, 1).unwrap(), Some(alice.clone()));
    assert_eq!(h.service.block(Tier::Page, 9).unwrap(), None);
    assert_eq!(h.service.find_page(system.hash()).unwrap(), Some(system));
    assert_eq!(h.service.find_page(&Hash256::digest(b"nope")).unwrap(), None);

    let by_alice = h.service.pages_by_validator("alice").unwrap();
    assert_eq!(by_alice.iter().map(Block::index).collect::<Vec<_>>(), vec![1, 2]);
    assert_eq!(h.service.summary().unwrap().length(Tier::Page), 3);
}
