//! Selectable word forms.
//!
//! A [`WordForm`] is a snapshot of one surface string taken from a [`Word`]
//! at the moment it was selected. Later edits to the word do not reach
//! forms that were already created.

use std::fmt;

use crate::error::{Error, Result};
use crate::word::{Word, WordType};

/// One selectable token: either a lemma or one specific inflected form.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WordForm {
    /// The text that appears in the sentence.
    pub surface: String,
    /// Lemma of the originating word.
    pub lemma: String,
    /// Translation of the originating word.
    pub translation: String,
    /// Grammatical type of the originating word.
    pub word_type: WordType,
    /// Description of the inflection this form came from, or `None` for
    /// the lemma itself.
    pub inflection_key: Option<String>,
}

impl WordForm {
    /// Creates the form for a word's lemma.
    #[must_use]
    pub fn lemma_of(word: &Word) -> Self {
        Self {
            surface: word.lemma.clone(),
            lemma: word.lemma.clone(),
            translation: word.translation.clone(),
            word_type: word.word_type,
            inflection_key: None,
        }
    }

    /// Creates the form for one of a word's inflections.
    ///
    /// # Errors
    ///
    /// Returns `UnknownInflection` if the word has no inflection with the
    /// given description.
    pub fn inflected(word: &Word, key: &str) -> Result<Self> {
        let inflection = word
            .inflection(key)
            .ok_or_else(|| Error::unknown_inflection(&word.lemma, key))?;
        Ok(Self {
            surface: inflection.form.clone(),
            lemma: word.lemma.clone(),
            translation: word.translation.clone(),
            word_type: word.word_type,
            inflection_key: Some(inflection.description.clone()),
        })
    }

    /// Returns every form of a word: the lemma, then each inflection in
    /// declared order.
    #[must_use]
    pub fn all_of(word: &Word) -> Vec<Self> {
        let mut forms = Vec::with_capacity(word.inflections.len() + 1);
        forms.push(Self::lemma_of(word));
        forms.extend(word.inflections.iter().map(|inflection| Self {
            surface: inflection.form.clone(),
            lemma: word.lemma.clone(),
            translation: word.translation.clone(),
            word_type: word.word_type,
            inflection_key: Some(inflection.description.clone()),
        }));
        forms
    }

    /// Returns true if this form is the lemma itself.
    #[must_use]
    pub const fn is_lemma(&self) -> bool {
        self.inflection_key.is_none()
    }
}

impl fmt::Display for WordForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inflection_key {
            None => write!(f, "{} ({})", self.surface, self.translation),
            Some(key) => write!(f, "{} ({} - {key})", self.surface, self.lemma),
        }
    }
}
