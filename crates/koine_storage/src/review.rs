//! Flashcard review progress.
//!
//! Progress follows a five-box Leitner system: a card graded easy moves up
//! one box (at most box 5), a card graded hard goes back to box 1, and the
//! box determines how many days pass before the card is due again.
//!
//! [`ReviewSession`] walks a deck of words in a seeded shuffled order, with
//! a flip state for showing the translation side.

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};
use koine_foundation::WordId;
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Highest Leitner box.
pub const MAX_BOX: u8 = 5;

/// Days until the next review for a card in the given box.
#[must_use]
pub const fn interval_days(box_level: u8) -> u64 {
    match box_level {
        0 | 1 => 1,
        2 => 2,
        3 => 5,
        4 => 14,
        _ => 30,
    }
}

/// How the learner rated a card.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Grade {
    /// Remembered: advance one box.
    Easy,
    /// Forgot: back to box 1.
    Hard,
}

/// Review state of one word.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewCard {
    /// The word this card reviews.
    pub word: WordId,
    /// Leitner box, 1 through [`MAX_BOX`].
    pub box_level: u8,
    /// First day the card is due.
    pub next_review: NaiveDate,
}

/// Review state for every enrolled word.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReviewProgress {
    cards: BTreeMap<WordId, ReviewCard>,
}

impl ReviewProgress {
    /// Creates empty progress.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restores progress from saved cards.
    #[must_use]
    pub fn from_cards(cards: impl IntoIterator<Item = ReviewCard>) -> Self {
        Self {
            cards: cards.into_iter().map(|c| (c.word.clone(), c)).collect(),
        }
    }

    /// Returns every card, ordered by word identity.
    pub fn cards(&self) -> impl Iterator<Item = &ReviewCard> {
        self.cards.values()
    }

    /// Returns the card for a word.
    #[must_use]
    pub fn card(&self, word: &WordId) -> Option<&ReviewCard> {
        self.cards.get(word)
    }

    /// Returns the number of enrolled words.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Returns true if no word is enrolled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Enrolls a word in box 1, due today. Returns false if it was
    /// already enrolled.
    pub fn enroll(&mut self, word: WordId, today: NaiveDate) -> bool {
        if self.cards.contains_key(&word) {
            return false;
        }
        self.cards.insert(
            word.clone(),
            ReviewCard {
                word,
                box_level: 1,
                next_review: today,
            },
        );
        true
    }

    /// Applies a grade and returns the updated card. Unknown words are
    /// enrolled first.
    pub fn grade(&mut self, word: &WordId, grade: Grade, today: NaiveDate) -> ReviewCard {
        let card = self.cards.entry(word.clone()).or_insert_with(|| ReviewCard {
            word: word.clone(),
            box_level: 1,
            next_review: today,
        });
        card.box_level = match grade {
            Grade::Easy => (card.box_level + 1).min(MAX_BOX),
            Grade::Hard => 1,
        };
        card.next_review = today
            .checked_add_days(Days::new(interval_days(card.box_level)))
            .unwrap_or(NaiveDate::MAX);
        card.clone()
    }

    /// Returns the words due on or before `today`, ordered by identity.
    #[must_use]
    pub fn due(&self, today: NaiveDate) -> Vec<&WordId> {
        self.cards
            .values()
            .filter(|c| c.next_review <= today)
            .map(|c| &c.word)
            .collect()
    }

    /// Drops the card for a deleted word.
    pub fn forget(&mut self, word: &WordId) -> Option<ReviewCard> {
        self.cards.remove(word)
    }

    /// Moves a card to a new identity after the word was edited.
    pub fn rename(&mut self, old: &WordId, new: WordId) {
        if old == &new {
            return;
        }
        if let Some(mut card) = self.cards.remove(old) {
            card.word = new.clone();
            self.cards.insert(new, card);
        }
    }
}

/// A pass over a deck of words, one card at a time.
#[derive(Clone, Debug)]
pub struct ReviewSession {
    deck: Vec<WordId>,
    position: usize,
    flipped: bool,
}

impl ReviewSession {
    /// Creates a session over the given words in a shuffled order fixed by
    /// `seed`.
    #[must_use]
    pub fn shuffled(words: impl IntoIterator<Item = WordId>, seed: u64) -> Self {
        let mut deck: Vec<_> = words.into_iter().collect();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        deck.shuffle(&mut rng);
        Self {
            deck,
            position: 0,
            flipped: false,
        }
    }

    /// Creates a session over the given words in the given order.
    #[must_use]
    pub fn in_order(words: impl IntoIterator<Item = WordId>) -> Self {
        Self {
            deck: words.into_iter().collect(),
            position: 0,
            flipped: false,
        }
    }

    /// Returns the card currently shown.
    #[must_use]
    pub fn current(&self) -> Option<&WordId> {
        self.deck.get(self.position)
    }

    /// Returns the 0-based index of the current card.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Returns the number of cards in the deck.
    #[must_use]
    pub fn len(&self) -> usize {
        self.deck.len()
    }

    /// Returns true if the deck has no cards.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.deck.is_empty()
    }

    /// Returns true if the answer side is showing.
    #[must_use]
    pub const fn is_flipped(&self) -> bool {
        self.flipped
    }

    /// Turns the current card over.
    pub fn flip(&mut self) {
        self.flipped = !self.flipped;
    }

    /// Advances to the next card, wrapping at the end.
    pub fn next(&mut self) -> Option<&WordId> {
        if !self.deck.is_empty() {
            self.position = (self.position + 1) % self.deck.len();
            self.flipped = false;
        }
        self.current()
    }

    /// Goes back to the previous card, wrapping at the start.
    pub fn previous(&mut self) -> Option<&WordId> {
        if !self.deck.is_empty() {
            self.position = (self.position + self.deck.len() - 1) % self.deck.len();
            self.flipped = false;
        }
        self.current()
    }

    /// Counter text such as `3 / 10`.
    #[must_use]
    pub fn counter(&self) -> String {
        if self.deck.is_empty() {
            "0 / 0".to_string()
        } else {
            format!("{} / {}", self.position + 1, self.deck.len())
        }
    }
}
