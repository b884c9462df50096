//! Session state for the REPL.
//!
//! A [`Session`] wires the word store to everything that follows it:
//!
//! ```text
//! WordStore ──on_change──► FormIndex        (suggestions, block lookup)
//!           └─on_change──► FactSync ──────► LogicSession (grammar oracle)
//! BlockSequence ──changes──► Coordinator ──► Indicator
//! ```
//!
//! Store listeners run synchronously inside each mutation, so the index and
//! the oracle's facts are current as soon as a store call returns.

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use chrono::{Local, NaiveDate};
use koine_engine::{
    BlockSequence, Coordinator, FactSync, FormIndex, GrammarOracle, Indicator, LogicSession,
    SentenceBlock, SequenceChanged, ValidationRound, collect, types_goal,
};
use koine_foundation::{Error, ErrorKind, Result, Word, WordForm, WordId};
use koine_storage::blob::{load_from_file, save_to_file};
use koine_storage::{Grade, ReviewCard, ReviewProgress, ReviewSession, StoreBlob, WordStore};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::RuntimeConfig;

/// The card currently shown in a review pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CardView {
    /// The word under review.
    pub word: Word,
    /// True once the translation side is shown.
    pub flipped: bool,
    /// Position counter, e.g. `3 / 12`.
    pub counter: String,
}

/// Everything one user works with: words, progress, grammar and sentence.
pub struct Session {
    config: RuntimeConfig,
    store: WordStore,
    progress: ReviewProgress,
    index: Rc<RefCell<FormIndex>>,
    facts: Rc<RefCell<FactSync>>,
    oracle: Rc<LogicSession>,
    sentence: BlockSequence,
    changes: mpsc::UnboundedReceiver<SequenceChanged>,
    coordinator: Coordinator,
    review: Option<ReviewSession>,
    grammar_error: Option<String>,
    today: Option<NaiveDate>,
}

impl Session {
    /// Creates a session with an empty store and no grammar loaded.
    #[must_use]
    pub fn new(config: RuntimeConfig) -> Self {
        let mut store = WordStore::new();
        let (index, _) = FormIndex::attach(&mut store);

        let oracle = Rc::new(LogicSession::new(&config.engine));
        let facts = Rc::new(RefCell::new(FactSync::new()));
        {
            let oracle = Rc::clone(&oracle);
            let facts = Rc::clone(&facts);
            store.on_change(move |event| {
                let report = facts.borrow_mut().sync(oracle.as_ref(), event.words.iter());
                debug!(revision = event.revision, ?report, "facts synchronized");
            });
        }

        let mut sentence = BlockSequence::new();
        let changes = sentence.subscribe();
        let coordinator = Coordinator::new(
            Rc::clone(&oracle) as Rc<dyn GrammarOracle>,
            config.engine.clone(),
        );

        Self {
            config,
            store,
            progress: ReviewProgress::new(),
            index,
            facts,
            oracle,
            sentence,
            changes,
            coordinator,
            review: None,
            grammar_error: None,
            today: None,
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Pins the date used for review scheduling.
    pub fn set_today(&mut self, today: NaiveDate) {
        self.today = Some(today);
    }

    fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }

    // =========================================================================
    // Grammar
    // =========================================================================

    /// Loads the configured grammar and asserts the facts of every stored
    /// word.
    ///
    /// On failure the session keeps working without validation and the
    /// error is remembered for [`grammar_error`](Self::grammar_error).
    ///
    /// # Errors
    ///
    /// Returns `IoError` if the grammar cannot be read, or `Config` if it
    /// does not consult.
    pub async fn load_grammar(&mut self) -> Result<()> {
        let outcome = match self.config.grammar.read().await {
            Ok(text) => self
                .oracle
                .load(&text)
                .await
                .map_err(|e| Error::new(ErrorKind::Config(e.to_string()))),
            Err(error) => Err(error),
        };

        match outcome {
            Ok(()) => {
                self.grammar_error = None;
                let report = self.facts.borrow_mut().sync(self.oracle.as_ref(), self.store.iter());
                info!(
                    clauses = self.oracle.clause_count(),
                    asserted = report.asserted,
                    "grammar ready"
                );
                Ok(())
            }
            Err(error) => {
                warn!(%error, "grammar unavailable");
                self.grammar_error = Some(error.to_string());
                Err(error)
            }
        }
    }

    /// Returns true once a grammar has loaded.
    #[must_use]
    pub fn grammar_ready(&self) -> bool {
        self.oracle.is_ready()
    }

    /// Returns why the grammar failed to load, if it did.
    #[must_use]
    pub fn grammar_error(&self) -> Option<&str> {
        self.grammar_error.as_deref()
    }

    /// Returns the number of word facts the oracle holds.
    #[must_use]
    pub fn fact_count(&self) -> usize {
        self.oracle.fact_count()
    }

    /// Lists every type the grammar knows for `surface`.
    ///
    /// # Errors
    ///
    /// Returns `Config` if the grammar is not loaded.
    pub async fn types(&self, surface: &str) -> Result<Vec<String>> {
        collect(self.oracle.as_ref(), &types_goal(surface), "T")
            .await
            .map_err(|e| Error::new(ErrorKind::Config(e.to_string())))
    }

    // =========================================================================
    // Words
    // =========================================================================

    /// Registers a word and enrolls it for review.
    ///
    /// # Errors
    ///
    /// Returns `InvalidWord` if the word is rejected by the store.
    pub fn add_word(&mut self, word: Word) -> Result<()> {
        let id = word.id();
        self.store.create(word)?;
        let today = self.today();
        self.progress.enroll(id, today);
        Ok(())
    }

    /// Replaces the word with identity `id`.
    ///
    /// # Errors
    ///
    /// Returns `WordNotFound` or `InvalidWord`.
    pub fn update_word(&mut self, id: &WordId, word: Word) -> Result<()> {
        let new_id = word.id();
        self.store.update(id, word)?;
        if &new_id != id {
            if self.store.get(id).is_some() {
                let today = self.today();
                self.progress.enroll(new_id, today);
            } else {
                self.progress.rename(id, new_id);
            }
        }
        Ok(())
    }

    /// Deletes a word. Its review card goes with it unless another stored
    /// word has the same identity.
    ///
    /// # Errors
    ///
    /// Returns `WordNotFound` if no word has that identity.
    pub fn remove_word(&mut self, id: &WordId) -> Result<Word> {
        let word = self.store.delete(id)?;
        if self.store.get(id).is_none() {
            self.progress.forget(id);
        }
        Ok(word)
    }

    /// Returns the stored words in order.
    pub fn words(&self) -> impl Iterator<Item = &Word> {
        self.store.iter()
    }

    /// Returns the word with identity `id`.
    #[must_use]
    pub fn word(&self, id: &WordId) -> Option<&Word> {
        self.store.get(id)
    }

    /// Returns the review card of a word.
    #[must_use]
    pub fn card(&self, id: &WordId) -> Option<&ReviewCard> {
        self.progress.card(id)
    }

    /// Returns the forms whose surface starts with `prefix`.
    #[must_use]
    pub fn suggest(&self, prefix: &str) -> Vec<WordForm> {
        self.index.borrow().lookup(prefix).into_iter().cloned().collect()
    }

    /// Returns a copy of the form index.
    #[must_use]
    pub fn form_index(&self) -> FormIndex {
        self.index.borrow().clone()
    }

    // =========================================================================
    // Sentence
    // =========================================================================

    /// Appends the form spelled `surface` to the sentence and returns the
    /// new length. When several words share the spelling, the first
    /// registered one is used.
    ///
    /// # Errors
    ///
    /// Returns `UnknownForm` if no stored word has that form.
    pub fn add_block(&mut self, surface: &str) -> Result<usize> {
        let form = {
            let index = self.index.borrow();
            let matches = index.exact(surface);
            if matches.len() > 1 {
                debug!(surface, candidates = matches.len(), "ambiguous form, using first");
            }
            matches.first().map(|f| (*f).clone())
        };
        let form = form.ok_or_else(|| Error::unknown_form(surface))?;
        Ok(self.sentence.append(form))
    }

    /// Removes the block at `position`.
    ///
    /// # Errors
    ///
    /// Returns `OutOfRange` if there is no such block.
    pub fn remove_block(&mut self, position: usize) -> Result<WordForm> {
        self.sentence.remove_at(position)
    }

    /// Moves the block at `from` so it lands before position `to`.
    ///
    /// # Errors
    ///
    /// Returns `OutOfRange` for an invalid position.
    pub fn move_block(&mut self, from: usize, to: usize) -> Result<()> {
        self.sentence.move_to(from, to)
    }

    /// Empties the sentence.
    pub fn clear_blocks(&mut self) {
        self.sentence.clear();
    }

    /// Returns the sentence blocks.
    #[must_use]
    pub fn blocks(&self) -> Vec<SentenceBlock> {
        self.sentence.blocks()
    }

    /// Validates every sentence change made since the last call, one round
    /// per change in order, and returns the last round.
    pub async fn settle(&mut self) -> Option<ValidationRound> {
        let mut last = None;
        while let Ok(change) = self.changes.try_recv() {
            debug!(revision = change.revision, "validating sentence change");
            last = Some(self.coordinator.validate_now(change.surfaces).await);
        }
        last
    }

    /// Validates the current sentence now. Pending changes are validated
    /// first; when there are none a fresh round is issued.
    pub async fn check(&mut self) -> ValidationRound {
        match self.settle().await {
            Some(round) => round,
            None => self.coordinator.validate_now(self.sentence.surfaces()).await,
        }
    }

    /// Returns the validity indicator.
    #[must_use]
    pub fn indicator(&self) -> Indicator {
        self.coordinator.indicator()
    }

    // =========================================================================
    // Review
    // =========================================================================

    /// Starts a review pass over every word, or only those due today, and
    /// returns the number of cards.
    pub fn start_review(&mut self, due_only: bool) -> usize {
        let ids: Vec<WordId> = if due_only {
            self.progress.due(self.today()).into_iter().cloned().collect()
        } else {
            self.store.iter().map(Word::id).collect()
        };
        let review = ReviewSession::shuffled(ids, self.config.seed);
        let len = review.len();
        self.review = Some(review);
        len
    }

    /// Returns the current card, if a pass is running.
    #[must_use]
    pub fn current_card(&self) -> Option<CardView> {
        let review = self.review.as_ref()?;
        let word = self.store.get(review.current()?)?;
        Some(CardView {
            word: word.clone(),
            flipped: review.is_flipped(),
            counter: review.counter(),
        })
    }

    /// Turns the current card over.
    ///
    /// # Errors
    ///
    /// Returns `Config` if no review is running.
    pub fn flip_card(&mut self) -> Result<()> {
        self.review_mut()?.flip();
        Ok(())
    }

    /// Moves to the next card.
    ///
    /// # Errors
    ///
    /// Returns `Config` if no review is running.
    pub fn next_card(&mut self) -> Result<()> {
        self.review_mut()?.next();
        Ok(())
    }

    /// Moves to the previous card.
    ///
    /// # Errors
    ///
    /// Returns `Config` if no review is running.
    pub fn previous_card(&mut self) -> Result<()> {
        self.review_mut()?.previous();
        Ok(())
    }

    /// Grades the current card and returns its new state.
    ///
    /// # Errors
    ///
    /// Returns `Config` if no review is running or the pass is exhausted.
    pub fn grade_card(&mut self, grade: Grade) -> Result<ReviewCard> {
        let id = self
            .review_mut()?
            .current()
            .cloned()
            .ok_or_else(|| Error::new(ErrorKind::Config("no card to grade".to_string())))?;
        let today = self.today();
        Ok(self.progress.grade(&id, grade, today))
    }

    fn review_mut(&mut self) -> Result<&mut ReviewSession> {
        self.review
            .as_mut()
            .ok_or_else(|| Error::new(ErrorKind::Config("no review in progress".to_string())))
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Saves words and progress to `path`, or the configured store file.
    ///
    /// # Errors
    ///
    /// Returns `IoError` or `SerializationError`.
    pub fn save(&self, path: Option<&Path>) -> Result<()> {
        let path = path.unwrap_or(&self.config.store_path);
        save_to_file(&StoreBlob::capture(&self.store, &self.progress), path)?;
        info!(path = %path.display(), words = self.store.len(), "store saved");
        Ok(())
    }

    /// Replaces words and progress with the contents of `path`, or the
    /// configured store file. The sentence is left alone.
    ///
    /// # Errors
    ///
    /// Returns `IoError` or `SerializationError`; the session is unchanged
    /// on error.
    pub fn load(&mut self, path: Option<&Path>) -> Result<usize> {
        let path = path.unwrap_or(&self.config.store_path).to_path_buf();
        let blob = load_from_file(&path)?;
        let count = blob.words.len();
        self.store.replace_all(blob.words);
        self.progress = ReviewProgress::from_cards(blob.progress);
        self.review = None;
        info!(path = %path.display(), words = count, "store loaded");
        Ok(count)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("words", &self.store.len())
            .field("blocks", &self.sentence.len())
            .field("grammar_ready", &self.oracle.is_ready())
            .field("indicator", &self.coordinator.indicator())
            .finish_non_exhaustive()
    }
}
