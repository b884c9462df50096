//! The word store.
//!
//! Words live in a persistent vector, so every [`StoreEvent`] can carry a
//! full snapshot of the store without copying the words themselves.
//!
//! Identity is the `(lemma, translation)` pair. Two entries may share it;
//! `update` and `delete` then act on the first match in store order.

use im::Vector;
use koine_foundation::{Error, Result, Word, WordId};
use tracing::debug;

/// What changed in a store mutation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreChange {
    /// A word was appended.
    Created(WordId),
    /// A word was overwritten in place.
    Updated {
        /// Identity before the update.
        old: WordId,
        /// Identity after the update.
        new: WordId,
    },
    /// A word was removed.
    Deleted(WordId),
    /// The whole content was replaced (e.g. after loading a blob).
    Replaced,
}

/// Notification delivered to store listeners after each mutation.
#[derive(Clone, Debug)]
pub struct StoreEvent {
    /// Store revision after the mutation.
    pub revision: u64,
    /// What changed.
    pub change: StoreChange,
    /// Snapshot of every word after the mutation.
    pub words: Vector<Word>,
}

/// Handle returned by [`WordStore::on_change`], used to unsubscribe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(&StoreEvent)>;

/// Keyed store of registered words.
#[derive(Default)]
pub struct WordStore {
    words: Vector<Word>,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener: u64,
    revision: u64,
}

impl WordStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding the given words, in order.
    #[must_use]
    pub fn from_words(words: impl IntoIterator<Item = Word>) -> Self {
        Self {
            words: words.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Returns a snapshot of every word, in store order.
    #[must_use]
    pub fn list(&self) -> Vector<Word> {
        self.words.clone()
    }

    /// Iterates the stored words in order.
    pub fn iter(&self) -> impl Iterator<Item = &Word> {
        self.words.iter()
    }

    /// Returns the first word with the given identity.
    #[must_use]
    pub fn get(&self, id: &WordId) -> Option<&Word> {
        self.words.iter().find(|w| w.has_id(id))
    }

    /// Returns the number of stored words.
    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Returns true if no words are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Returns the current revision (incremented by every mutation).
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Appends a new word.
    ///
    /// # Errors
    ///
    /// Returns `InvalidWord` if the word fails validation.
    pub fn create(&mut self, word: Word) -> Result<()> {
        word.validate().map_err(|e| e.with_context("create"))?;
        let id = word.id();
        self.words.push_back(word);
        self.emit(StoreChange::Created(id));
        Ok(())
    }

    /// Overwrites the first word with the given identity.
    ///
    /// # Errors
    ///
    /// Returns `WordNotFound` if no word has the identity, or
    /// `InvalidWord` if the replacement fails validation.
    pub fn update(&mut self, id: &WordId, word: Word) -> Result<()> {
        word.validate().map_err(|e| e.with_context("update"))?;
        let index = self.position(id)?;
        let new = word.id();
        self.words.set(index, word);
        self.emit(StoreChange::Updated {
            old: id.clone(),
            new,
        });
        Ok(())
    }

    /// Removes the first word with the given identity and returns it.
    ///
    /// # Errors
    ///
    /// Returns `WordNotFound` if no word has the identity.
    pub fn delete(&mut self, id: &WordId) -> Result<Word> {
        let index = self.position(id)?;
        let removed = self.words.remove(index);
        self.emit(StoreChange::Deleted(id.clone()));
        Ok(removed)
    }

    /// Replaces the whole content of the store.
    pub fn replace_all(&mut self, words: impl IntoIterator<Item = Word>) {
        self.words = words.into_iter().collect();
        self.emit(StoreChange::Replaced);
    }

    /// Registers a listener called after every successful mutation.
    pub fn on_change(&mut self, listener: impl FnMut(&StoreEvent) + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Removes a listener. Returns false if it was not registered.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    fn position(&self, id: &WordId) -> Result<usize> {
        self.words
            .iter()
            .position(|w| w.has_id(id))
            .ok_or_else(|| Error::word_not_found(id))
    }

    fn emit(&mut self, change: StoreChange) {
        self.revision += 1;
        debug!(revision = self.revision, ?change, "word store changed");
        let event = StoreEvent {
            revision: self.revision,
            change,
            words: self.words.clone(),
        };
        for (_, listener) in &mut self.listeners {
            listener(&event);
        }
    }
}

impl std::fmt::Debug for WordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WordStore")
            .field("words", &self.words)
            .field("listeners", &self.listeners.len())
            .field("revision", &self.revision)
            .finish()
    }
}
