//! Error types for the Koine system.
//!
//! Uses `thiserror` for ergonomic error definition with rich context.

use std::fmt;

use thiserror::Error;

use crate::word::WordId;

/// Result alias used across the Koine crates.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for vocabulary and sentence operations.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional context about where the error occurred.
    pub context: Option<String>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Adds context to this error.
    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Creates an out-of-range position error.
    #[must_use]
    pub fn out_of_range(position: usize, length: usize) -> Self {
        Self::new(ErrorKind::OutOfRange { position, length })
    }

    /// Creates a word not found error.
    #[must_use]
    pub fn word_not_found(id: &WordId) -> Self {
        Self::new(ErrorKind::WordNotFound(id.clone()))
    }

    /// Creates an invalid word error.
    #[must_use]
    pub fn invalid_word(reason: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidWord(reason.into()))
    }

    /// Creates an unknown inflection error.
    #[must_use]
    pub fn unknown_inflection(lemma: impl Into<String>, key: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnknownInflection {
            lemma: lemma.into(),
            key: key.into(),
        })
    }

    /// Creates an unknown form error.
    #[must_use]
    pub fn unknown_form(surface: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnknownForm(surface.into()))
    }

    /// Returns true if this is an out-of-range error.
    #[must_use]
    pub const fn is_out_of_range(&self) -> bool {
        matches!(self.kind, ErrorKind::OutOfRange { .. })
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// A sentence position did not name an existing block.
    #[error("position {position} out of range (length {length})")]
    OutOfRange {
        /// The position that was requested.
        position: usize,
        /// The length of the sequence at the time.
        length: usize,
    },

    /// No stored word has the given identity.
    #[error("word not found: {0}")]
    WordNotFound(WordId),

    /// A word failed validation on creation or update.
    #[error("invalid word: {0}")]
    InvalidWord(String),

    /// A form referenced an inflection the word does not declare.
    #[error("word '{lemma}' has no inflection '{key}'")]
    UnknownInflection {
        /// Lemma of the originating word.
        lemma: String,
        /// The inflection key that was requested.
        key: String,
    },

    /// No stored word has a form with the given surface.
    #[error("no word form '{0}'")]
    UnknownForm(String),

    /// Encoding or decoding the store blob failed.
    #[error("serialization error: {0}")]
    SerializationError(String),

    /// Reading or writing a file failed.
    #[error("I/O error: {0}")]
    IoError(String),

    /// A configuration value could not be used.
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen).
    #[error("internal error: {0}")]
    Internal(String),
}

/// Where in the sentence workflow an error surfaced.
///
/// Used by the runtime to decide between a banner and an inline message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    /// Blocks validation until corrected.
    Fatal,
    /// Logged; work continues with stale state.
    Degraded,
    /// A programming error in the caller.
    Bug,
}

impl ErrorKind {
    /// Returns how this kind of error should be surfaced.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        match self {
            Self::OutOfRange { .. } | Self::Internal(_) => Severity::Bug,
            Self::Config(_) => Severity::Fatal,
            Self::WordNotFound(_)
            | Self::InvalidWord(_)
            | Self::UnknownInflection { .. }
            | Self::UnknownForm(_)
            | Self::SerializationError(_)
            | Self::IoError(_) => Severity::Degraded,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fatal => write!(f, "fatal"),
            Self::Degraded => write!(f, "degraded"),
            Self::Bug => write!(f, "bug"),
        }
    }
}
