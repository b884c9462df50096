//! Prefix lookup over every selectable word form.
//!
//! The index is a derived view of the word store. It holds every form in
//! store order (each lemma followed by its inflections in declared order)
//! along with a case-folded copy of each surface, and is rebuilt whole on
//! every store change.

use std::cell::RefCell;
use std::rc::Rc;

use koine_foundation::{Word, WordForm};
use koine_storage::{ListenerId, WordStore};
use tracing::trace;

/// Read-only index of word forms.
#[derive(Clone, Debug, Default)]
pub struct FormIndex {
    forms: Vec<WordForm>,
    folded: Vec<String>,
    revision: u64,
}

impl FormIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an index over `words`.
    #[must_use]
    pub fn build<'a>(words: impl IntoIterator<Item = &'a Word>) -> Self {
        let mut index = Self::new();
        index.rebuild(words, 0);
        index
    }

    /// Attaches a shared index to a store: it is built from the current
    /// content and rebuilt after every change.
    pub fn attach(store: &mut WordStore) -> (Rc<RefCell<Self>>, ListenerId) {
        let index = Rc::new(RefCell::new(Self::new()));
        index.borrow_mut().rebuild(store.iter(), store.revision());
        let shared = Rc::clone(&index);
        let listener = store.on_change(move |event| {
            shared.borrow_mut().rebuild(event.words.iter(), event.revision);
        });
        (index, listener)
    }

    /// Replaces the content with the forms of `words`.
    pub fn rebuild<'a>(&mut self, words: impl IntoIterator<Item = &'a Word>, revision: u64) {
        self.forms = words.into_iter().flat_map(WordForm::all_of).collect();
        self.folded = self.forms.iter().map(|f| fold(&f.surface)).collect();
        self.revision = revision;
        trace!(forms = self.forms.len(), revision, "form index rebuilt");
    }

    /// Returns the forms whose surface starts with `prefix`, ignoring case
    /// and surrounding whitespace. An empty prefix returns every form.
    #[must_use]
    pub fn lookup(&self, prefix: &str) -> Vec<&WordForm> {
        let prefix = fold(prefix.trim());
        self.matching(|surface| surface.starts_with(&prefix))
    }

    /// Returns the forms whose surface equals `surface`, ignoring case and
    /// surrounding whitespace.
    #[must_use]
    pub fn exact(&self, surface: &str) -> Vec<&WordForm> {
        let surface = fold(surface.trim());
        self.matching(|candidate| candidate == surface)
    }

    fn matching(&self, predicate: impl Fn(&str) -> bool) -> Vec<&WordForm> {
        self.forms
            .iter()
            .zip(&self.folded)
            .filter(|(_, folded)| predicate(folded))
            .map(|(form, _)| form)
            .collect()
    }

    /// Returns every form in index order.
    #[must_use]
    pub fn forms(&self) -> &[WordForm] {
        &self.forms
    }

    /// Returns the number of forms.
    #[must_use]
    pub fn len(&self) -> usize {
        self.forms.len()
    }

    /// Returns true if the index holds no forms.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.forms.is_empty()
    }

    /// Returns the store revision this index was built from.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }
}

fn fold(text: &str) -> String {
    text.to_lowercase()
}
