//! Integration tests for the word store
//!
//! Tests CRUD operations, first-match identity, and change listeners.

use std::cell::RefCell;
use std::rc::Rc;

use koine_foundation::{ErrorKind, Word, WordId, WordType};
use koine_storage::{StoreChange, WordStore};

fn word(lemma: &str, translation: &str) -> Word {
    Word::new(lemma, translation, WordType::Noun)
}

// =============================================================================
// CRUD
// =============================================================================

#[test]
fn create_appends_in_order() {
    let mut store = WordStore::new();
    store.create(word("λόγος", "word")).unwrap();
    store.create(word("θεός", "god")).unwrap();
    let lemmas: Vec<&str> = store.iter().map(|w| w.lemma.as_str()).collect();
    assert_eq!(lemmas, vec!["λόγος", "θεός"]);
    assert_eq!(store.revision(), 2);
}

#[test]
fn create_rejects_invalid_words() {
    let mut store = WordStore::new();
    let err = store.create(word("", "nothing")).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::InvalidWord(_)));
    assert!(store.is_empty());
    assert_eq!(store.revision(), 0);
}

#[test]
fn update_replaces_in_place() {
    let mut store = WordStore::from_words([word("λόγος", "word"), word("θεός", "god")]);
    let edited = word("λόγος", "word").with_inflection("λόγου", "Genitive Singular");
    store.update(&WordId::new("λόγος", "word"), edited).unwrap();
    assert_eq!(store.list()[0].inflections.len(), 1);
    assert_eq!(store.len(), 2);
}

#[test]
fn missing_identity_is_not_found() {
    let mut store = WordStore::new();
    let id = WordId::new("λόγος", "word");
    assert!(matches!(store.delete(&id).unwrap_err().kind, ErrorKind::WordNotFound(_)));
    assert!(matches!(
        store.update(&id, word("λόγος", "word")).unwrap_err().kind,
        ErrorKind::WordNotFound(_)
    ));
}

#[test]
fn duplicate_identities_resolve_to_first() {
    let mut store = WordStore::new();
    store.create(word("λόγος", "word")).unwrap();
    store
        .create(word("λόγος", "word").with_inflection("λόγου", "Genitive Singular"))
        .unwrap();
    let removed = store.delete(&WordId::new("λόγος", "word")).unwrap();
    assert!(removed.inflections.is_empty());
    assert_eq!(store.len(), 1);
    assert!(store.get(&WordId::new("λόγος", "word")).is_some());
}

// =============================================================================
// Listeners
// =============================================================================

#[test]
fn listeners_see_every_mutation() {
    let mut store = WordStore::new();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&seen);
    store.on_change(move |event| log.borrow_mut().push((event.change.clone(), event.words.len())));

    store.create(word("λόγος", "word")).unwrap();
    store.delete(&WordId::new("λόγος", "word")).unwrap();
    store.replace_all([word("θεός", "god"), word("ἄνθρωπος", "human")]);

    assert_eq!(
        *seen.borrow(),
        vec![
            (StoreChange::Created(WordId::new("λόγος", "word")), 1),
            (StoreChange::Deleted(WordId::new("λόγος", "word")), 0),
            (StoreChange::Replaced, 2),
        ]
    );
}

#[test]
fn failed_mutations_do_not_notify() {
    let mut store = WordStore::new();
    let count = Rc::new(RefCell::new(0));
    let counter = Rc::clone(&count);
    store.on_change(move |_| *counter.borrow_mut() += 1);

    let _ = store.create(word("", "x"));
    let _ = store.delete(&WordId::new("a", "b"));
    assert_eq!(*count.borrow(), 0);
}

#[test]
fn removed_listener_stops_hearing() {
    let mut store = WordStore::new();
    let count = Rc::new(RefCell::new(0));
    let counter = Rc::clone(&count);
    let id = store.on_change(move |_| *counter.borrow_mut() += 1);

    store.create(word("λόγος", "word")).unwrap();
    assert!(store.remove_listener(id));
    assert!(!store.remove_listener(id));
    store.create(word("θεός", "god")).unwrap();
    assert_eq!(*count.borrow(), 1);
}
