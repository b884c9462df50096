//! Core vocabulary types and errors for Koine.
//!
//! This crate provides:
//! - [`Word`] - A registered lemma with its translation and inflections
//! - [`WordType`] - Grammatical category of a word
//! - [`WordForm`] - One selectable surface string derived from a word
//! - [`Error`] - Rich error types with context

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod form;
pub mod word;

pub use error::{Error, ErrorKind, Result, Severity};
pub use form::WordForm;
pub use word::{Inflection, Word, WordId, WordType};
