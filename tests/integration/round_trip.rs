//! Words travel from the store to the index, the oracle and back.

use koine_foundation::{Word, WordForm, WordId, WordType};
use koine_runtime::{RuntimeConfig, Session};
use proptest::prelude::*;

fn logos() -> Word {
    Word::new("λόγος", "word", WordType::Noun)
        .with_inflection("λόγου", "Genitive Singular")
        .with_inflection("λόγῳ", "Dative Singular")
}

#[tokio::test]
async fn created_word_lists_field_for_field() {
    let mut session = Session::new(RuntimeConfig::default());
    session.load_grammar().await.unwrap();
    session.add_word(logos()).unwrap();

    let listed: Vec<&Word> = session.words().collect();
    assert_eq!(listed, vec![&logos()]);
    assert_eq!(session.suggest(""), WordForm::all_of(&logos()));
    assert_eq!(session.types("λόγῳ").await.unwrap(), vec!["noun"]);
}

#[tokio::test]
async fn deleted_word_leaves_every_view() {
    let mut session = Session::new(RuntimeConfig::default());
    session.load_grammar().await.unwrap();
    session.add_word(logos()).unwrap();
    session
        .add_word(Word::new("θεός", "god", WordType::Noun))
        .unwrap();

    let removed = session.remove_word(&WordId::new("λόγος", "word")).unwrap();
    assert_eq!(removed, logos());
    assert!(session.words().all(|w| w.lemma != "λόγος"));
    assert!(session.suggest("λ").is_empty());
    assert_eq!(session.suggest("").len(), 1);
    assert!(session.types("λόγου").await.unwrap().is_empty());
}

#[tokio::test]
async fn blocks_keep_their_snapshot_after_the_word_is_edited() {
    let mut session = Session::new(RuntimeConfig::default());
    session.add_word(logos()).unwrap();
    session.add_block("λόγου").unwrap();

    let edited = Word::new("λόγος", "reason", WordType::Noun);
    session.update_word(&WordId::new("λόγος", "word"), edited).unwrap();

    let blocks = session.blocks();
    assert_eq!(blocks[0].word_form.translation, "word");
    assert!(session.suggest("λόγου").is_empty());
    assert!(session.card(&WordId::new("λόγος", "reason")).is_some());
}

fn greek_word() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(vec!['α', 'ε', 'λ', 'ο', 'γ', 'ς', 'θ']), 1..6)
        .prop_map(|chars| chars.into_iter().collect())
}

proptest! {
    #[test]
    fn empty_lookup_lists_every_form(lemmas in prop::collection::vec(greek_word(), 0..8)) {
        let mut session = Session::new(RuntimeConfig::default());
        let mut expected = 0;
        for (i, lemma) in lemmas.iter().enumerate() {
            let word = Word::new(lemma.clone(), format!("meaning {i}"), WordType::Noun)
                .with_inflection(format!("{lemma}ου"), "Genitive Singular");
            expected += 2;
            session.add_word(word).unwrap();
        }
        prop_assert_eq!(session.suggest("").len(), expected);
    }
}
