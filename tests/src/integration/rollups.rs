//! Rollup catch-up and idempotence over the chain file.

use super::fixtures::{LedgerHarness, ALICE};
use cl_03_ledger::test_utils::payload;
use cl_03_ledger::{LedgerApi, Tier};
use chrono::Duration;
use serde_json::json;

const DAY: i64 = 86_400;

#[test]
fn test_first_append_opens_every_tier() {
    let h = LedgerHarness::new();
    let page = h.append_system(0);

    let state = h.reopen().snapshot().unwrap();
    for tier in Tier::AGGREGATES {
        assert_eq!(state.len(tier), 1, "{} tier", tier);
    }
    let chapter = &state.tier(Tier::Chapter)[0];
    assert_eq!(chapter.children().len(), 1);
    assert_eq!(&chapter.children()[0].hash, page.hash());
    assert!(h.ledger.validate_chain());
}

#[test]
fn test_fifty_pages_caught_up_in_one_chapter() {
    let h = LedgerHarness::new();
    for n in 0..50 {
        h.append_system(n);
    }
    // Page 0 opened chapter 0; the other 49 wait for the next interval
    assert_eq!(h.ledger.snapshot().unwrap().len(Tier::Chapter), 1);

    h.clock.advance(Duration::seconds(DAY));
    let outcome = h.ledger.run_rollups().unwrap();

    let chapters: Vec<_> = outcome.created_in(Tier::Chapter).collect();
    assert_eq!(chapters.len(), 1);
    let chapter = chapters[0];
    assert_eq!(chapter.index(), 1);
    let indices: Vec<u64> = chapter.children().iter().map(|child| child.index).collect();
    assert_eq!(indices, (1..50).collect::<Vec<u64>>());
    assert_eq!(outcome.created_in(Tier::Book).count(), 0);
    assert!(outcome.errors.is_empty());

    let reopened = h.reopen();
    assert_eq!(reopened.snapshot().unwrap().len(Tier::Chapter), 2);
    assert!(reopened.validate_chain());
}

#[test]
fn test_rollup_is_idempotent() {
    let h = LedgerHarness::new();
    for n in 0..5 {
        h.append_system(n);
    }
    h.clock.advance(Duration::seconds(DAY));

    let first = h.ledger.run_rollups().unwrap();
    assert_eq!(first.created_in(Tier::Chapter).count(), 1);
    let summary = h.ledger.summary().unwrap();

    let second = h.ledger.run_rollups().unwrap();
    assert!(second.is_empty());
    assert_eq!(h.ledger.summary().unwrap(), summary);

    // Due again, but nothing new to roll up
    h.clock.advance(Duration::seconds(DAY));
    assert!(h.ledger.run_rollups().unwrap().is_empty());
}

#[test]
fn test_append_triggers_due_rollup() {
    let h = LedgerHarness::new();
    h.append_system(0);
    h.append_system(1);

    h.clock.advance(Duration::seconds(DAY));
    h.ledger
        .append_page(payload(json!({"action": "vote"})), ALICE, None)
        .unwrap();

    let state = h.ledger.snapshot().unwrap();
    let chapter = state.last_block(Tier::Chapter).unwrap();
    assert_eq!(chapter.index(), 1);
    assert_eq!(chapter.children().len(), 2);
    // Aggregates carry the newest child's validator and signature
    assert_eq!(chapter.validator(), ALICE);
    assert_eq!(chapter.signature(), state.pages()[2].signature());
    assert!(h.ledger.validate_chain());
}

#[test]
fn test_books_gather_chapters_after_interval() {
    let h = LedgerHarness::new();
    h.append_system(0);
    h.clock.advance(Duration::seconds(DAY));
    h.append_system(1);
    h.clock.advance(Duration::seconds(DAY));
    h.append_system(2);
    assert_eq!(h.ledger.snapshot().unwrap().len(Tier::Chapter), 3);

    h.clock.advance(Duration::seconds(30 * DAY));
    let outcome = h.ledger.run_rollups().unwrap();
    assert_eq!(outcome.created_in(Tier::Chapter).count(), 0);

    let books: Vec<_> = outcome.created_in(Tier::Book).collect();
    assert_eq!(books.len(), 1);
    let indices: Vec<u64> = books[0].children().iter().map(|child| child.index).collect();
    assert_eq!(indices, vec![1, 2]);
    assert_eq!(outcome.created_in(Tier::Part).count(), 0);
    assert!(h.reopen().validate_chain());
}
