//! Integration tests for the form index
//!
//! Tests prefix lookup, exact lookup and store-driven rebuilds.

use koine_engine::FormIndex;
use koine_foundation::{Word, WordId, WordType};
use koine_storage::WordStore;
use proptest::prelude::*;

fn vocabulary() -> Vec<Word> {
    vec![
        Word::new("λόγος", "word", WordType::Noun)
            .with_inflection("λόγου", "Genitive Singular")
            .with_inflection("λόγῳ", "Dative Singular"),
        Word::new("λέγω", "I say", WordType::Verb)
            .with_inflection("λέγει", "Present Indicative Active 3rd Person Singular"),
        Word::new("Ζεύς", "Zeus", WordType::Noun),
        Word::new("ὁ", "the", WordType::Article),
    ]
}

fn surfaces(index: &FormIndex, prefix: &str) -> Vec<String> {
    index.lookup(prefix).iter().map(|f| f.surface.clone()).collect()
}

// =============================================================================
// Lookup
// =============================================================================

#[test]
fn lookup_keeps_store_order() {
    let index = FormIndex::build(&vocabulary());
    assert_eq!(surfaces(&index, "λ"), vec!["λόγος", "λόγου", "λόγῳ", "λέγω", "λέγει"]);
    assert_eq!(surfaces(&index, "λόγ"), vec!["λόγος", "λόγου", "λόγῳ"]);
}

#[test]
fn lookup_ignores_case_and_padding() {
    let index = FormIndex::build(&vocabulary());
    assert_eq!(surfaces(&index, " ζε "), vec!["Ζεύς"]);
    assert_eq!(surfaces(&index, "ΛΈΓ"), vec!["λέγω", "λέγει"]);
}

#[test]
fn empty_prefix_lists_everything() {
    let index = FormIndex::build(&vocabulary());
    assert_eq!(index.lookup("").len(), index.len());
    assert_eq!(index.len(), 7);
}

#[test]
fn exact_lookup_distinguishes_forms() {
    let index = FormIndex::build(&vocabulary());
    let hits = index.exact("λόγου");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].lemma, "λόγος");
    assert_eq!(hits[0].inflection_key.as_deref(), Some("Genitive Singular"));
    assert!(index.exact("λόγ").is_empty());
}

// =============================================================================
// Store Wiring
// =============================================================================

#[test]
fn deleted_words_leave_the_index() {
    let mut store = WordStore::from_words(vocabulary());
    let (index, _) = FormIndex::attach(&mut store);
    assert_eq!(surfaces(&index.borrow(), "λόγ").len(), 3);

    store.delete(&WordId::new("λόγος", "word")).unwrap();
    assert!(surfaces(&index.borrow(), "λόγ").is_empty());
    assert_eq!(index.borrow().revision(), store.revision());
}

#[test]
fn detached_index_stops_following() {
    let mut store = WordStore::from_words(vocabulary());
    let (index, listener) = FormIndex::attach(&mut store);
    assert!(store.remove_listener(listener));
    store.replace_all(Vec::new());
    assert_eq!(index.borrow().len(), 7);
}

// =============================================================================
// Properties
// =============================================================================

fn greekish() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(vec!['α', 'β', 'λ', 'ό', 'γ', 'Λ', 'Α']), 0..4)
        .prop_map(|chars| chars.into_iter().collect())
}

proptest! {
    #[test]
    fn longer_prefixes_never_widen(words in prop::collection::vec(greekish(), 1..12),
                                   prefix in greekish(),
                                   extra in greekish()) {
        let words: Vec<Word> = words
            .into_iter()
            .filter(|w| !w.is_empty())
            .map(|lemma| Word::new(lemma, "x", WordType::Other))
            .collect();
        let index = FormIndex::build(&words);

        let narrow = surfaces(&index, &format!("{prefix}{extra}"));
        let wide = surfaces(&index, &prefix);
        prop_assert!(narrow.len() <= wide.len());
        for surface in &narrow {
            prop_assert!(wide.contains(surface));
        }
    }

    #[test]
    fn exact_hits_are_prefix_hits(words in prop::collection::vec(greekish(), 1..12),
                                  query in greekish()) {
        let words: Vec<Word> = words
            .into_iter()
            .filter(|w| !w.is_empty())
            .map(|lemma| Word::new(lemma, "x", WordType::Other))
            .collect();
        let index = FormIndex::build(&words);
        let prefix_hits = surfaces(&index, &query);
        for form in index.exact(&query) {
            prop_assert!(prefix_hits.contains(&form.surface));
        }
    }
}
