//! Integration tests for words and word forms
//!
//! Tests identity, validation, surfaces and form snapshots.

use koine_foundation::{ErrorKind, Word, WordForm, WordId, WordType};

fn anthropos() -> Word {
    Word::new("ἄνθρωπος", "human", WordType::Noun)
        .with_inflection("ἀνθρώπου", "Genitive Singular")
        .with_inflection("ἄνθρωπον", "Accusative Singular")
}

// =============================================================================
// Identity
// =============================================================================

#[test]
fn identity_is_lemma_and_translation() {
    let word = anthropos();
    assert_eq!(word.id(), WordId::new("ἄνθρωπος", "human"));
    assert!(word.has_id(&WordId::new("ἄνθρωπος", "human")));
    assert!(!word.has_id(&WordId::new("ἄνθρωπος", "person")));
}

#[test]
fn same_lemma_different_translation_is_a_different_word() {
    let a = Word::new("λόγος", "word", WordType::Noun);
    let b = Word::new("λόγος", "reason", WordType::Noun);
    assert_ne!(a.id(), b.id());
}

// =============================================================================
// Validation
// =============================================================================

#[test]
fn blank_fields_are_invalid() {
    for word in [
        Word::new("", "human", WordType::Noun),
        Word::new("ἄνθρωπος", "  ", WordType::Noun),
        Word::new("ἄνθρωπος", "human", WordType::Noun).with_inflection("", "Genitive Singular"),
    ] {
        let err = word.validate().unwrap_err();
        assert!(matches!(err.kind, ErrorKind::InvalidWord(_)));
    }
    assert!(anthropos().validate().is_ok());
}

// =============================================================================
// Word Types
// =============================================================================

#[test]
fn word_types_parse_case_insensitively() {
    assert_eq!("Noun".parse::<WordType>().unwrap(), WordType::Noun);
    assert_eq!(" verb ".parse::<WordType>().unwrap(), WordType::Verb);
    assert!("particle".parse::<WordType>().is_err());
}

#[test]
fn every_word_type_round_trips_through_its_atom() {
    for word_type in WordType::ALL {
        assert_eq!(word_type.atom().parse::<WordType>().unwrap(), word_type);
    }
}

// =============================================================================
// Forms
// =============================================================================

#[test]
fn surfaces_list_lemma_then_inflections() {
    let word = anthropos();
    let surfaces: Vec<&str> = word.surfaces().collect();
    assert_eq!(surfaces, vec!["ἄνθρωπος", "ἀνθρώπου", "ἄνθρωπον"]);
}

#[test]
fn all_forms_carry_their_origin() {
    let forms = WordForm::all_of(&anthropos());
    assert_eq!(forms.len(), 3);
    assert!(forms[0].is_lemma());
    assert_eq!(forms[2].inflection_key.as_deref(), Some("Accusative Singular"));
    assert!(forms.iter().all(|f| f.lemma == "ἄνθρωπος" && f.translation == "human"));
}

#[test]
fn inflected_form_requires_known_description() {
    let word = anthropos();
    let form = WordForm::inflected(&word, "Genitive Singular").unwrap();
    assert_eq!(form.surface, "ἀνθρώπου");

    let err = WordForm::inflected(&word, "Dative Plural").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::UnknownInflection { .. }));
}

#[test]
fn forms_are_snapshots() {
    let mut word = anthropos();
    let form = WordForm::lemma_of(&word);
    word.translation = "person".to_string();
    assert_eq!(form.translation, "human");
}
