//! Fault injection on the atomic chain file write.

use super::fixtures::LedgerHarness;
use cl_03_ledger::test_utils::{payload, DestructiveReplacer, FailingReplacer};
use cl_03_ledger::{AppendError, LedgerApi, PersistenceError, Tier};
use serde_json::json;

#[test]
fn test_failed_replace_leaves_chain_untouched() {
    let h = LedgerHarness::new();
    h.append_system(0);
    h.append_system(1);
    let before = std::fs::read(h.chain_path()).unwrap();

    let faulty = h.open_with(FailingReplacer);
    let result = faulty.append_page(payload(json!({"n": 2})), "SYSTEM", None);

    assert!(matches!(
        result,
        Err(AppendError::Persistence(PersistenceError::RolledBack(_)))
    ));
    assert!(!faulty.is_halted());
    assert_eq!(std::fs::read(h.chain_path()).unwrap(), before);

    // The healthy writer carries on from the intact state
    let next = h.append_system(2);
    assert_eq!(next.index(), 2);
    assert!(h.ledger.validate_chain());
}

#[test]
fn test_damaged_file_restored_from_backup() {
    let h = LedgerHarness::new();
    h.append_system(0);
    h.append_system(1);
    let before = std::fs::read(h.chain_path()).unwrap();

    let crashing = h.open_with(DestructiveReplacer);
    let result = crashing.append_page(payload(json!({"n": 2})), "SYSTEM", None);

    assert!(matches!(
        result,
        Err(AppendError::Persistence(PersistenceError::RolledBack(_)))
    ));
    assert!(!crashing.is_halted());
    assert_eq!(std::fs::read(h.chain_path()).unwrap(), before);
    assert_eq!(h.ledger.snapshot().unwrap().len(Tier::Page), 2);
    assert!(h.ledger.validate_chain());
}

#[test]
fn test_unrecoverable_write_halts_ledger() {
    let h = LedgerHarness::new();

    // No previous file and no backup: the damage cannot be undone
    let crashing = h.open_with(DestructiveReplacer);
    let result = crashing.append_page(payload(json!({"n": 0})), "SYSTEM", None);

    assert!(matches!(
        result,
        Err(AppendError::Persistence(PersistenceError::Unrecoverable(_)))
    ));
    assert!(crashing.is_halted());
    assert!(matches!(
        crashing.append_page(payload(json!({"n": 1})), "SYSTEM", None),
        Err(AppendError::Halted)
    ));
    assert!(matches!(crashing.run_rollups(), Err(AppendError::Halted)));

    // Reads report the damage instead of an empty chain
    assert!(matches!(
        crashing.snapshot(),
        Err(PersistenceError::Corrupt(_))
    ));
    assert!(!crashing.validate_chain());
}

#[test]
fn test_backups_pruned_to_retention() {
    let h = LedgerHarness::new();
    for n in 0..10 {
        h.append_system(n);
    }

    let backups = h.ledger.persistence().backups();
    assert_eq!(backups.len(), h.config().backup_retention);
    // The newest backup holds the state before the last write
    let newest: cl_03_ledger::ChainState =
        serde_json::from_slice(&std::fs::read(backups.last().unwrap()).unwrap()).unwrap();
    assert_eq!(newest.len(Tier::Page), 9);
}

#[test]
fn test_rollup_saves_do_not_use_up_retention() {
    let h = LedgerHarness::new();
    // Every append is a day apart, so every append also rolls up a chapter
    for n in 0..8 {
        h.append_system(n);
        h.clock.advance(chrono::Duration::days(1));
    }
    assert_eq!(h.ledger.snapshot().unwrap().len(Tier::Chapter), 8);

    // One backup per page write: the five newest hold pages 3 through 7
    let backups = h.ledger.persistence().backups();
    assert_eq!(backups.len(), h.config().backup_retention);
    let page_counts: Vec<usize> = backups
        .iter()
        .map(|backup| {
            let state: cl_03_ledger::ChainState =
                serde_json::from_slice(&std::fs::read(backup).unwrap()).unwrap();
            state.len(Tier::Page)
        })
        .collect();
    assert_eq!(page_counts, vec![3, 4, 5, 6, 7]);
}
