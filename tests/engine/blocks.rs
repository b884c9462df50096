//! Integration tests for the block sequence
//!
//! Tests sentence edits against a plain list model and change
//! notifications.

use koine_engine::BlockSequence;
use koine_foundation::{Word, WordForm, WordType};
use proptest::prelude::*;

fn form(surface: &str) -> WordForm {
    WordForm::lemma_of(&Word::new(surface, "x", WordType::Other))
}

// =============================================================================
// Notifications
// =============================================================================

#[test]
fn each_edit_sends_the_whole_sentence() {
    let mut seq = BlockSequence::new();
    let mut changes = seq.subscribe();

    seq.append(form("ὁ"));
    seq.append(form("λόγος"));
    seq.move_to(1, 0).unwrap();

    let first = changes.try_recv().unwrap();
    assert_eq!(first.surfaces, vec!["ὁ"]);
    let second = changes.try_recv().unwrap();
    assert_eq!(second.revision, first.revision + 1);
    assert_eq!(changes.try_recv().unwrap().surfaces, vec!["λόγος", "ὁ"]);
    assert!(changes.try_recv().is_err());
}

#[test]
fn failed_edits_send_nothing() {
    let mut seq = BlockSequence::new();
    seq.append(form("ὁ"));
    let mut changes = seq.subscribe();
    let revision = seq.revision();

    assert!(seq.remove_at(3).unwrap_err().is_out_of_range());
    assert!(seq.move_to(0, 2).is_err());
    assert!(seq.move_to(4, 0).is_err());
    assert_eq!(seq.revision(), revision);
    assert!(changes.try_recv().is_err());
}

#[test]
fn dropped_subscribers_do_not_block_edits() {
    let mut seq = BlockSequence::new();
    let changes = seq.subscribe();
    drop(changes);
    seq.append(form("ὁ"));
    seq.clear();
    assert!(seq.is_empty());
}

#[test]
fn drop_on_uses_vertical_midpoint() {
    let mut seq = BlockSequence::new();
    for s in ["a", "b", "c"] {
        seq.append(form(s));
    }
    // Upper half of "a" inserts before it.
    seq.drop_on(2, 0, 5.0, 0.0, 20.0).unwrap();
    assert_eq!(seq.surfaces(), vec!["c", "a", "b"]);
    // Lower half of "b" inserts after it.
    seq.drop_on(0, 2, 35.0, 20.0, 20.0).unwrap();
    assert_eq!(seq.surfaces(), vec!["a", "b", "c"]);
}

// =============================================================================
// Model Check
// =============================================================================

#[derive(Clone, Debug)]
enum Edit {
    Append,
    Remove(usize),
    Move(usize, usize),
    Clear,
}

fn edit() -> impl Strategy<Value = Edit> {
    prop_oneof![
        4 => Just(Edit::Append),
        2 => (0..8usize).prop_map(Edit::Remove),
        3 => (0..8usize, 0..9usize).prop_map(|(a, b)| Edit::Move(a, b)),
        1 => Just(Edit::Clear),
    ]
}

proptest! {
    #[test]
    fn matches_a_plain_list(edits in prop::collection::vec(edit(), 0..50)) {
        let mut seq = BlockSequence::new();
        let mut changes = seq.subscribe();
        let mut model: Vec<String> = Vec::new();
        let mut next = 0usize;
        let mut applied = 0u64;

        for edit in edits {
            let ok = match edit {
                Edit::Append => {
                    let surface = format!("w{next}");
                    next += 1;
                    seq.append(form(&surface));
                    model.push(surface);
                    true
                }
                Edit::Remove(i) => {
                    let ok = i < model.len();
                    if ok {
                        model.remove(i);
                    }
                    prop_assert_eq!(seq.remove_at(i).is_ok(), ok);
                    ok
                }
                Edit::Move(from, to) => {
                    let ok = from < model.len() && to <= model.len();
                    if ok {
                        let item = model.remove(from);
                        model.insert(if to > from { to - 1 } else { to }, item);
                    }
                    prop_assert_eq!(seq.move_to(from, to).is_ok(), ok);
                    ok
                }
                Edit::Clear => {
                    seq.clear();
                    model.clear();
                    true
                }
            };
            if ok {
                applied += 1;
                let change = changes.try_recv().unwrap();
                prop_assert_eq!(&change.surfaces, &model);
            }
            prop_assert_eq!(seq.surfaces(), model.clone());
            prop_assert_eq!(seq.revision(), applied);
        }
    }
}
