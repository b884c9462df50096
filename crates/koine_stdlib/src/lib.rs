//! Bundled grammar and inflection paradigms for Koine.
//!
//! This crate provides:
//! - [`GRAMMAR`] - The default sentence grammar, loaded when no grammar
//!   file is given
//! - [`paradigm`] - The inflections each word type is expected to have

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod paradigms;

pub use paradigms::{Paradigm, Slot, paradigm};

/// Source of the bundled Koine Greek grammar.
///
/// Defines `sentence/1` over word facts asserted by the engine, names the
/// problems of a rejected sentence with `diagnose/2`, and declares `word_type/2`, `translation/2` and `inflection/3` dynamic, so
/// it answers (with no proof) before any word is stored.
pub const GRAMMAR: &str = include_str!("../grammar/koine.pl");
