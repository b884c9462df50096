//! Explanations for invalid sentences.
//!
//! When a sentence has no proof, the coordinator asks the grammar's
//! diagnosis predicate for every problem it can name:
//!
//! ```text
//! diagnose(Words, Problem).
//! ```
//!
//! Each `Problem` is a term such as `unknown_word('Ζεύς')` or
//! `agreement(ὁ, λόγου)`. Its functor is the [`Diagnostic`] code and its
//! arguments are the words involved.

use std::fmt;

use koine_logic::{Term, parse_goal};

/// One problem the grammar found in a sentence.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Diagnostic {
    /// What kind of problem this is (the term's functor).
    pub code: String,
    /// The words involved, in argument order.
    pub words: Vec<String>,
}

impl Diagnostic {
    /// Creates a diagnostic.
    #[must_use]
    pub fn new(code: impl Into<String>, words: Vec<String>) -> Self {
        Self {
            code: code.into(),
            words,
        }
    }

    /// Reads a diagnostic from the written form of a problem term.
    ///
    /// Returns `None` if the text is not an atom or compound term.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let term = parse_goal(text).ok()?.term;
        let (name, _) = term.functor()?;
        let words = term.args().iter().map(word_text).collect();
        Some(Self::new(name.to_string(), words))
    }

    fn word(&self, index: usize) -> &str {
        self.words.get(index).map_or("?", String::as_str)
    }
}

fn word_text(term: &Term) -> String {
    match term {
        Term::Atom(name) => name.to_string(),
        other => other.to_string(),
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code.as_str() {
            "unknown_word" => write!(f, "'{}' is not a known word form", self.word(0)),
            "missing_verb" => f.write_str("no verb found; add a verb to complete the sentence"),
            "extra_verb" => write!(f, "'{}' is a second finite verb", self.word(0)),
            "agreement" => write!(
                f,
                "article '{}' does not agree with '{}' in case and number",
                self.word(0),
                self.word(1)
            ),
            "subject_agreement" => write!(
                f,
                "subject '{}' does not agree with verb '{}' in number",
                self.word(0),
                self.word(1)
            ),
            "preposition_object" => {
                write!(f, "preposition '{}' needs a noun phrase after it", self.word(0))
            }
            "preposition_case" => write!(
                f,
                "preposition '{}' cannot govern the nominative '{}'",
                self.word(0),
                self.word(1)
            ),
            "unrecognized" => {
                f.write_str("sentence structure not recognized; check case forms and agreement")
            }
            code if self.words.is_empty() => f.write_str(code),
            code => write!(f, "{code}: {}", self.words.join(", ")),
        }
    }
}

/// Builds the goal listing every problem of `surfaces` under `predicate`,
/// bound to `P`.
#[must_use]
pub fn diagnosis_goal(predicate: &str, surfaces: &[String]) -> String {
    let words = Term::list(surfaces.iter().map(|s| Term::atom(s)), Term::nil());
    format!("{}({words}, P)", Term::atom(predicate))
}
