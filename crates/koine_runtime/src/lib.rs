//! REPL, CLI, and session wiring for Koine.
//!
//! This crate provides:
//! - [`Session`] - A word store, review progress, grammar oracle and
//!   sentence wired together
//! - [`Repl`] - Interactive command loop over a session
//! - [`RuntimeConfig`] - Settings gathered from the command line
//! - [`logging`] - `tracing` subscriber setup

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod commands;
pub mod config;
pub mod editor;
pub mod logging;
pub mod repl;
pub mod session;

pub use commands::{Command, CommandError, ReviewAction};
pub use config::{GrammarSource, RuntimeConfig};
pub use editor::{LineEditor, ReadResult, RustylineEditor};
pub use repl::{Repl, Reply};
pub use session::{CardView, Session};
