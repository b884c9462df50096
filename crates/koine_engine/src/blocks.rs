//! The sentence under construction.
//!
//! A [`BlockSequence`] is an ordered list of chosen word forms. Positions
//! are always `0..len`; removing or moving a block closes the gap. Every
//! successful mutation sends a [`SequenceChanged`] to each subscriber, and
//! that event is the only thing that triggers re-validation. Failed
//! mutations change nothing and send nothing.

use koine_foundation::{Error, Result, WordForm};
use tokio::sync::mpsc;
use tracing::trace;

/// A block at a position in the sentence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SentenceBlock {
    /// Zero-based position.
    pub position: usize,
    /// The chosen form.
    pub word_form: WordForm,
}

/// Notification sent after each successful mutation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SequenceChanged {
    /// Increases by one with every mutation.
    pub revision: u64,
    /// Surfaces of the whole sentence after the mutation.
    pub surfaces: Vec<String>,
}

/// Ordered, mutable list of sentence blocks.
#[derive(Debug, Default)]
pub struct BlockSequence {
    forms: Vec<WordForm>,
    revision: u64,
    subscribers: Vec<mpsc::UnboundedSender<SequenceChanged>>,
}

impl BlockSequence {
    /// Creates an empty sequence.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a subscriber for change events.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<SequenceChanged> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    /// Returns the number of blocks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.forms.len()
    }

    /// Returns true if the sentence is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.forms.is_empty()
    }

    /// Returns the mutation count so far.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Returns the form at `position`.
    #[must_use]
    pub fn get(&self, position: usize) -> Option<&WordForm> {
        self.forms.get(position)
    }

    /// Returns the blocks with their positions.
    #[must_use]
    pub fn blocks(&self) -> Vec<SentenceBlock> {
        self.forms
            .iter()
            .enumerate()
            .map(|(position, form)| SentenceBlock {
                position,
                word_form: form.clone(),
            })
            .collect()
    }

    /// Returns the surface of every block, in order.
    #[must_use]
    pub fn surfaces(&self) -> Vec<String> {
        self.forms.iter().map(|f| f.surface.clone()).collect()
    }

    /// Adds a block at the end and returns the new length.
    pub fn append(&mut self, form: WordForm) -> usize {
        self.forms.push(form);
        self.changed("append");
        self.forms.len()
    }

    /// Removes the block at `position`, returning its form.
    ///
    /// # Errors
    ///
    /// Returns `OutOfRange` if there is no block at `position`.
    pub fn remove_at(&mut self, position: usize) -> Result<WordForm> {
        self.check(position)?;
        let removed = self.forms.remove(position);
        self.changed("remove");
        Ok(removed)
    }

    /// Moves the block at `from` so it lands before the block currently at
    /// `to`. `to == len` moves it to the end.
    ///
    /// # Errors
    ///
    /// Returns `OutOfRange` if `from` is not a block or `to > len`.
    pub fn move_to(&mut self, from: usize, to: usize) -> Result<()> {
        self.check(from)?;
        if to > self.forms.len() {
            return Err(Error::out_of_range(to, self.forms.len()).with_context("move target"));
        }
        let form = self.forms.remove(from);
        let insert_at = if to > from { to - 1 } else { to };
        self.forms.insert(insert_at, form);
        self.changed("move");
        Ok(())
    }

    /// Drops the block at `from` onto the block at `target`.
    ///
    /// A pointer above the target's vertical midpoint inserts before the
    /// target; at or below it inserts after.
    ///
    /// # Errors
    ///
    /// Returns `OutOfRange` if `from` or `target` is not a block.
    pub fn drop_on(
        &mut self,
        from: usize,
        target: usize,
        pointer_y: f64,
        target_top: f64,
        target_height: f64,
    ) -> Result<()> {
        self.check(target)?;
        let midpoint = target_top + target_height / 2.0;
        let to = if pointer_y < midpoint { target } else { target + 1 };
        self.move_to(from, to)
    }

    /// Removes every block.
    pub fn clear(&mut self) {
        self.forms.clear();
        self.changed("clear");
    }

    fn check(&self, position: usize) -> Result<()> {
        if position < self.forms.len() {
            Ok(())
        } else {
            Err(Error::out_of_range(position, self.forms.len()))
        }
    }

    fn changed(&mut self, operation: &'static str) {
        self.revision += 1;
        let event = SequenceChanged {
            revision: self.revision,
            surfaces: self.surfaces(),
        };
        trace!(operation, revision = self.revision, len = self.forms.len(), "sentence changed");
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}
