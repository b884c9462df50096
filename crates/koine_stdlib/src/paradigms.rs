//! Inflection paradigms.
//!
//! A paradigm lists the inflections a word type is expected to have. Each
//! slot has a short key used when typing forms (`genS=λόγου`) and the full
//! label stored as the inflection description (`Genitive Singular`). The
//! labels are the ones the bundled grammar understands.

use koine_foundation::{Word, WordType};

/// One expected inflection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Slot {
    /// Short key, e.g. `genS`.
    pub key: &'static str,
    /// Full description, e.g. `Genitive Singular`.
    pub label: &'static str,
}

const fn slot(key: &'static str, label: &'static str) -> Slot {
    Slot { key, label }
}

const VERB: &[Slot] = &[
    slot("present1s", "Present Indicative Active 1st Person Singular"),
    slot("present2s", "Present Indicative Active 2nd Person Singular"),
    slot("present3s", "Present Indicative Active 3rd Person Singular"),
    slot("present1p", "Present Indicative Active 1st Person Plural"),
    slot("present2p", "Present Indicative Active 2nd Person Plural"),
    slot("present3p", "Present Indicative Active 3rd Person Plural"),
];

const CASES: &[Slot] = &[
    slot("nomS", "Nominative Singular"),
    slot("genS", "Genitive Singular"),
    slot("datS", "Dative Singular"),
    slot("accS", "Accusative Singular"),
    slot("vocS", "Vocative Singular"),
    slot("nomP", "Nominative Plural"),
    slot("genP", "Genitive Plural"),
    slot("datP", "Dative Plural"),
    slot("accP", "Accusative Plural"),
    slot("vocP", "Vocative Plural"),
];

const ADJECTIVE: &[Slot] = &[
    slot("mNomS", "Masculine Nominative Singular"),
    slot("fNomS", "Feminine Nominative Singular"),
    slot("nNomS", "Neuter Nominative Singular"),
    slot("mAccS", "Masculine Accusative Singular"),
    slot("fAccS", "Feminine Accusative Singular"),
    slot("nAccS", "Neuter Accusative Singular"),
];

/// The expected inflections of one word type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Paradigm {
    /// The word type.
    pub word_type: WordType,
    /// Slots in conventional order.
    pub slots: &'static [Slot],
}

impl Paradigm {
    /// Finds a slot by key, ignoring case.
    #[must_use]
    pub fn by_key(&self, key: &str) -> Option<&'static Slot> {
        self.slots.iter().find(|s| s.key.eq_ignore_ascii_case(key))
    }

    /// Finds a slot by its full label.
    #[must_use]
    pub fn by_label(&self, label: &str) -> Option<&'static Slot> {
        self.slots.iter().find(|s| s.label == label)
    }

    /// Returns the slots `word` has no inflection for.
    #[must_use]
    pub fn missing(&self, word: &Word) -> Vec<&'static Slot> {
        self.slots
            .iter()
            .filter(|s| word.inflection(s.label).is_none())
            .collect()
    }

    /// Returns true if the type takes no inflections.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Returns the paradigm of a word type. Uninflected types get an empty
/// one.
#[must_use]
pub const fn paradigm(word_type: WordType) -> Paradigm {
    let slots = match word_type {
        WordType::Verb => VERB,
        WordType::Noun | WordType::Article | WordType::Pronoun => CASES,
        WordType::Adjective => ADJECTIVE,
        WordType::Adverb | WordType::Conjunction | WordType::Preposition | WordType::Other => &[],
    };
    Paradigm { word_type, slots }
}
