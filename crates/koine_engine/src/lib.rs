//! Grammar validation engine for Koine.
//!
//! This crate provides:
//! - [`GrammarOracle`] - The narrow interface to a logic backend
//! - [`LogicSession`] - An in-process oracle over the `koine_logic` solver
//! - [`FactSync`] - Keeps word facts in the oracle in step with the store
//! - [`FormIndex`] - Prefix lookup over every lemma and inflected form
//! - [`BlockSequence`] - The ordered sentence under construction
//! - [`Coordinator`] - Validation rounds with supersession by round id
//! - [`Diagnostic`] - A problem the grammar names in an invalid sentence
//!
//! # Data flow
//!
//! ```text
//! user edit ──► BlockSequence ──SequenceChanged──► Coordinator ──goal──► GrammarOracle
//!                                                      │                      │
//!                                 watch<Indicator> ◄───┴──── answers ◄────────┘
//!
//! WordStore ──StoreEvent──► FormIndex (rebuild)
//!                      └──► FactSync (retract stale, assert new)
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod blocks;
pub mod config;
pub mod coordinator;
pub mod diagnosis;
pub mod facts;
pub mod index;
pub mod oracle;
pub mod session;

pub use blocks::{BlockSequence, SentenceBlock, SequenceChanged};
pub use config::EngineConfig;
pub use coordinator::{Coordinator, ErrorReason, Indicator, RoundStatus, ValidationRound, Verdict};
pub use diagnosis::{Diagnostic, diagnosis_goal};
pub use facts::{FactSync, SyncReport, types_goal};
pub use index::FormIndex;
pub use oracle::{
    AnswerStream, AssertError, Binding, Bindings, GrammarOracle, LoadError, QueryError, collect,
};
pub use session::LogicSession;
