//! Integration tests for review progress
//!
//! Tests Leitner box movement, due dates and review passes.

use chrono::NaiveDate;
use koine_foundation::WordId;
use koine_storage::review::{MAX_BOX, interval_days};
use koine_storage::{Grade, ReviewProgress, ReviewSession};

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
}

fn id(lemma: &str) -> WordId {
    WordId::new(lemma, "x")
}

// =============================================================================
// Leitner Boxes
// =============================================================================

#[test]
fn easy_climbs_to_the_top_box() {
    let mut progress = ReviewProgress::new();
    progress.enroll(id("λόγος"), day(1));
    let mut card = None;
    for _ in 0..10 {
        card = Some(progress.grade(&id("λόγος"), Grade::Easy, day(1)));
    }
    let card = card.unwrap();
    assert_eq!(card.box_level, MAX_BOX);
    assert_eq!(card.next_review, day(31));
}

#[test]
fn hard_drops_to_box_one() {
    let mut progress = ReviewProgress::new();
    progress.enroll(id("λόγος"), day(1));
    progress.grade(&id("λόγος"), Grade::Easy, day(1));
    progress.grade(&id("λόγος"), Grade::Easy, day(1));
    let card = progress.grade(&id("λόγος"), Grade::Hard, day(2));
    assert_eq!(card.box_level, 1);
    assert_eq!(card.next_review, day(3));
}

#[test]
fn intervals_grow_with_box() {
    let intervals: Vec<u64> = (1..=MAX_BOX).map(interval_days).collect();
    assert!(intervals.windows(2).all(|w| w[0] < w[1]));
}

// =============================================================================
// Due Cards
// =============================================================================

#[test]
fn due_respects_dates() {
    let mut progress = ReviewProgress::new();
    progress.enroll(id("α"), day(1));
    progress.enroll(id("β"), day(1));
    assert!(!progress.enroll(id("α"), day(9)));

    progress.grade(&id("α"), Grade::Easy, day(1));
    assert_eq!(progress.due(day(1)), vec![&id("β")]);
    assert_eq!(progress.due(day(3)).len(), 2);
}

#[test]
fn forget_and_rename() {
    let mut progress = ReviewProgress::new();
    progress.enroll(id("α"), day(1));
    progress.rename(&id("α"), id("β"));
    assert!(progress.card(&id("α")).is_none());
    assert!(progress.card(&id("β")).is_some());
    assert!(progress.forget(&id("β")).is_some());
    assert!(progress.is_empty());
}

// =============================================================================
// Review Passes
// =============================================================================

#[test]
fn shuffle_is_seeded() {
    let words: Vec<WordId> = ["α", "β", "γ", "δ", "ε", "ζ"].into_iter().map(id).collect();
    let order = |seed| {
        let mut session = ReviewSession::shuffled(words.clone(), seed);
        let mut seen = Vec::new();
        for _ in 0..session.len() {
            seen.push(session.current().cloned().unwrap());
            session.next();
        }
        seen
    };
    assert_eq!(order(7), order(7));
    let mut sorted = order(7);
    sorted.sort();
    let mut expected = words.clone();
    expected.sort();
    assert_eq!(sorted, expected);
}

#[test]
fn navigation_wraps_and_resets_flip() {
    let mut session = ReviewSession::in_order([id("α"), id("β")]);
    session.flip();
    assert!(session.is_flipped());
    assert_eq!(session.next(), Some(&id("β")));
    assert!(!session.is_flipped());
    assert_eq!(session.next(), Some(&id("α")));
    assert_eq!(session.previous(), Some(&id("β")));
    assert_eq!(session.counter(), "2 / 2");
}

#[test]
fn empty_pass_has_no_cards() {
    let mut session = ReviewSession::in_order(Vec::new());
    assert!(session.is_empty());
    assert!(session.next().is_none());
    assert_eq!(session.counter(), "0 / 0");
}
