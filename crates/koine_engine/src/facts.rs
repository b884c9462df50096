//! Word facts in the oracle's working memory.
//!
//! Every stored word contributes:
//!
//! ```text
//! word_type(Surface, Type).            one per lemma and inflected form
//! translation(Lemma, Translation).
//! inflection(Form, Lemma, Description).
//! ```
//!
//! [`FactSync`] remembers what it asserted, so each store change retracts
//! exactly the facts that went stale and asserts only the new ones.

use std::collections::BTreeSet;

use koine_foundation::Word;
use koine_logic::Term;
use koine_logic::term::quote_atom;
use tracing::{debug, warn};

use crate::oracle::GrammarOracle;

/// Returns the facts that describe one word, in a stable order.
#[must_use]
pub fn facts_for(word: &Word) -> Vec<String> {
    let mut facts = Vec::with_capacity(2 * word.inflections.len() + 2);
    let type_atom = Term::atom(word.word_type.atom());
    for surface in word.surfaces() {
        facts.push(fact("word_type", vec![Term::atom(surface), type_atom.clone()]));
    }
    facts.push(fact(
        "translation",
        vec![Term::atom(&word.lemma), Term::atom(&word.translation)],
    ));
    for inflection in &word.inflections {
        facts.push(fact(
            "inflection",
            vec![
                Term::atom(&inflection.form),
                Term::atom(&word.lemma),
                Term::atom(&inflection.description),
            ],
        ));
    }
    facts
}

fn fact(name: &str, args: Vec<Term>) -> String {
    Term::compound(name, args).to_string()
}

/// Returns the goal listing every type the oracle knows for `surface`,
/// bound to `T`.
#[must_use]
pub fn types_goal(surface: &str) -> String {
    format!("word_type({}, T)", quote_atom(surface))
}

/// Outcome of one synchronization pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Facts newly asserted.
    pub asserted: usize,
    /// Facts retracted because no word produces them any more.
    pub retracted: usize,
    /// Facts the oracle refused; they are retried on the next pass.
    pub failed: usize,
}

impl SyncReport {
    /// Returns true if nothing changed and nothing failed.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.asserted == 0 && self.retracted == 0 && self.failed == 0
    }
}

/// Tracks the word facts currently asserted in an oracle.
#[derive(Clone, Debug, Default)]
pub struct FactSync {
    asserted: BTreeSet<String>,
}

impl FactSync {
    /// Creates a tracker that has asserted nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of facts believed to be asserted.
    #[must_use]
    pub fn len(&self) -> usize {
        self.asserted.len()
    }

    /// Returns true if no facts are asserted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.asserted.is_empty()
    }

    /// Returns true if `fact` is currently asserted.
    #[must_use]
    pub fn contains(&self, fact: &str) -> bool {
        self.asserted.contains(fact)
    }

    /// Brings the oracle in line with `words`.
    ///
    /// Failures are logged and counted, never returned: validation goes on
    /// with whatever facts the oracle holds.
    pub fn sync<'a>(
        &mut self,
        oracle: &dyn GrammarOracle,
        words: impl IntoIterator<Item = &'a Word>,
    ) -> SyncReport {
        let wanted: BTreeSet<String> = words.into_iter().flat_map(facts_for).collect();
        let mut report = SyncReport::default();

        let stale: Vec<String> = self.asserted.difference(&wanted).cloned().collect();
        for fact in stale {
            match oracle.retract(&fact) {
                Ok(_) => {
                    self.asserted.remove(&fact);
                    report.retracted += 1;
                }
                Err(error) => {
                    warn!(%fact, %error, "retract failed");
                    report.failed += 1;
                }
            }
        }

        let fresh: Vec<String> = wanted.difference(&self.asserted).cloned().collect();
        for fact in fresh {
            match oracle.assert_fact(&fact) {
                Ok(()) => {
                    self.asserted.insert(fact);
                    report.asserted += 1;
                }
                Err(error) => {
                    warn!(%fact, %error, "assert failed");
                    report.failed += 1;
                }
            }
        }

        debug!(?report, total = self.asserted.len(), "word facts synchronized");
        report
    }
}
