//! Words, word types, and inflections.
//!
//! A [`Word`] is the unit a learner registers: a lemma, its translation,
//! its grammatical type, and the inflected forms they have entered.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Grammatical category of a word.
///
/// Each variant maps to a lowercase atom used in grammar facts
/// (`word_type(Surface, noun)`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum WordType {
    /// Verb
    Verb,
    /// Noun
    Noun,
    /// Adjective
    Adjective,
    /// Adverb
    Adverb,
    /// Conjunction
    Conjunction,
    /// Preposition
    Preposition,
    /// Pronoun
    Pronoun,
    /// Article
    Article,
    /// Anything else
    Other,
}

impl WordType {
    /// All word types, in declaration order.
    pub const ALL: [Self; 9] = [
        Self::Verb,
        Self::Noun,
        Self::Adjective,
        Self::Adverb,
        Self::Conjunction,
        Self::Preposition,
        Self::Pronoun,
        Self::Article,
        Self::Other,
    ];

    /// Returns the grammar atom for this type.
    #[must_use]
    pub const fn atom(self) -> &'static str {
        match self {
            Self::Verb => "verb",
            Self::Noun => "noun",
            Self::Adjective => "adjective",
            Self::Adverb => "adverb",
            Self::Conjunction => "conjunction",
            Self::Preposition => "preposition",
            Self::Pronoun => "pronoun",
            Self::Article => "article",
            Self::Other => "other",
        }
    }

    /// Returns a capitalized label for display.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Verb => "Verb",
            Self::Noun => "Noun",
            Self::Adjective => "Adjective",
            Self::Adverb => "Adverb",
            Self::Conjunction => "Conjunction",
            Self::Preposition => "Preposition",
            Self::Pronoun => "Pronoun",
            Self::Article => "Article",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for WordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.atom())
    }
}

impl FromStr for WordType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|t| t.atom() == wanted)
            .ok_or_else(|| Error::invalid_word(format!("unknown word type: {s}")))
    }
}

/// One inflected form of a word.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Inflection {
    /// The surface text of the form (e.g. `λόγου`).
    pub form: String,
    /// What the form is (e.g. `Genitive Singular`). Doubles as the
    /// inflection key referenced by [`WordForm`](crate::WordForm).
    pub description: String,
}

impl Inflection {
    /// Creates a new inflection.
    #[must_use]
    pub fn new(form: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            form: form.into(),
            description: description.into(),
        }
    }
}

/// Identity of a stored word: the `(lemma, translation)` pair.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WordId {
    /// Lemma of the word.
    pub lemma: String,
    /// Translation of the word.
    pub translation: String,
}

impl WordId {
    /// Creates a new identity.
    #[must_use]
    pub fn new(lemma: impl Into<String>, translation: impl Into<String>) -> Self {
        Self {
            lemma: lemma.into(),
            translation: translation.into(),
        }
    }
}

impl fmt::Display for WordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.lemma, self.translation)
    }
}

/// A registered word.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Word {
    /// Dictionary form.
    pub lemma: String,
    /// Meaning in the learner's language.
    pub translation: String,
    /// Grammatical category.
    pub word_type: WordType,
    /// Inflected forms, in declared order.
    pub inflections: Vec<Inflection>,
}

impl Word {
    /// Creates a word with no inflections.
    #[must_use]
    pub fn new(lemma: impl Into<String>, translation: impl Into<String>, word_type: WordType) -> Self {
        Self {
            lemma: lemma.into(),
            translation: translation.into(),
            word_type,
            inflections: Vec::new(),
        }
    }

    /// Builder method to add an inflection.
    #[must_use]
    pub fn with_inflection(mut self, form: impl Into<String>, description: impl Into<String>) -> Self {
        self.inflections.push(Inflection::new(form, description));
        self
    }

    /// Returns the identity of this word.
    #[must_use]
    pub fn id(&self) -> WordId {
        WordId::new(self.lemma.clone(), self.translation.clone())
    }

    /// Returns true if this word has the given identity.
    #[must_use]
    pub fn has_id(&self, id: &WordId) -> bool {
        self.lemma == id.lemma && self.translation == id.translation
    }

    /// Finds an inflection by its description.
    #[must_use]
    pub fn inflection(&self, description: &str) -> Option<&Inflection> {
        self.inflections.iter().find(|i| i.description == description)
    }

    /// Iterates every surface string of this word: the lemma first, then
    /// each inflection form in declared order.
    pub fn surfaces(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.lemma.as_str()).chain(self.inflections.iter().map(|i| i.form.as_str()))
    }

    /// Checks that the word can be stored.
    ///
    /// # Errors
    ///
    /// Returns `InvalidWord` if the lemma or translation is blank, or any
    /// inflection form is blank.
    pub fn validate(&self) -> Result<()> {
        if self.lemma.trim().is_empty() {
            return Err(Error::invalid_word("lemma must not be empty"));
        }
        if self.translation.trim().is_empty() {
            return Err(Error::invalid_word("translation must not be empty"));
        }
        if let Some(index) = self.inflections.iter().position(|i| i.form.trim().is_empty()) {
            return Err(Error::invalid_word(format!(
                "inflection {index} of '{}' has an empty form",
                self.lemma
            )));
        }
        Ok(())
    }
}
