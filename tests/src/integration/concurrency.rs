//! Many threads appending through one shared ledger.

use super::fixtures::{LedgerHarness, ALICE};
use cl_03_ledger::test_utils::payload;
use cl_03_ledger::{LedgerApi, Tier};
use serde_json::json;
use std::sync::{Arc, Barrier};
use std::thread;

const THREADS: u64 = 8;
const PER_THREAD: u64 = 5;

#[test]
fn test_concurrent_appends_get_distinct_indices() {
    let h = LedgerHarness::new();
    let barrier = Arc::new(Barrier::new(THREADS as usize));

    let handles: Vec<_> = (0..THREADS)
        .map(|worker| {
            let ledger = h.ledger.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                (0..PER_THREAD)
                    .map(|n| {
                        ledger
                            .append_page(payload(json!({"worker": worker, "n": n})), "SYSTEM", None)
                            .unwrap()
                            .index()
                    })
                    .collect::<Vec<u64>>()
            })
        })
        .collect();

    let mut indices: Vec<u64> = handles
        .into_iter()
        .flat_map(|handle| handle.join().unwrap())
        .collect();
    indices.sort_unstable();
    assert_eq!(indices, (0..THREADS * PER_THREAD).collect::<Vec<u64>>());

    let state = h.reopen().snapshot().unwrap();
    assert_eq!(state.len(Tier::Page) as u64, THREADS * PER_THREAD);
    for pair in state.pages().windows(2) {
        assert_eq!(pair[1].previous_hash(), pair[0].hash());
    }
    assert!(h.ledger.validate_chain());
}

#[test]
fn test_readers_never_see_partial_writes() {
    let h = LedgerHarness::new();
    h.append_system(0);

    let writer = {
        let ledger = h.ledger.clone();
        thread::spawn(move || {
            for n in 0..20 {
                ledger
                    .append_page(payload(json!({"action": "vote", "n": n})), ALICE, None)
                    .unwrap();
            }
        })
    };
    let reader = {
        let ledger = h.reopen();
        thread::spawn(move || {
            for _ in 0..50 {
                // Every load parses: the file is only ever replaced whole
                let state = ledger.snapshot().unwrap();
                assert!(state.len(Tier::Page) >= 1);
            }
        })
    };

    writer.join().unwrap();
    reader.join().unwrap();
    assert_eq!(h.ledger.snapshot().unwrap().len(Tier::Page), 21);
    assert!(h.ledger.validate_chain());
}
