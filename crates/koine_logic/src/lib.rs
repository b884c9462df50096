//! Lexer, parser, clause database, and solver for Koine's logic grammar
//! language, a fixed subset of Prolog.
//!
//! This crate provides:
//! - [`Lexer`] - Tokenization of grammar source
//! - [`Parser`] - Operator-precedence parsing of clauses and goals into [`Term`]s
//! - [`Program`] - A consulted rule program, with DCG rules translated
//! - [`Database`] - Program clauses plus asserted facts, snapshotted per query
//! - [`Solver`] - Lazy, pull-driven enumeration of solutions
//!
//! # Pipeline
//!
//! ```text
//! "sentence([W1,W2]) :- word_type(W1, article), word_type(W2, noun)."
//!          │
//!          ▼
//! ┌─────────────────┐
//! │   LEXER         │  → Name(sentence) Punct(() Punct([) Var(W1) ...
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │   PARSER        │  → ':-'(sentence('.'(_0, '.'(_1, []))), ','(...))
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │   DATABASE      │  → sentence/1: [clause], word_type/2: dynamic
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │   SOLVER        │  → Solution { W1 = ..., W2 = ... }, ..., exhausted
//! └─────────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod arith;
pub mod database;
pub mod dcg;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod solver;
pub mod span;
pub mod term;
pub mod token;
mod unify;


pub use database::{Clause, Database, PredicateKey, Program};
pub use error::{ConsultError, ExecutionError, SyntaxError};
pub use lexer::Lexer;
pub use parser::{Parser, ReadTerm, parse_goal, parse_program};
pub use solver::{DEFAULT_INFERENCE_LIMIT, Query, Solution, Solver, Step};
pub use span::Span;
pub use term::{Atom, Term};
pub use token::{Token, TokenKind};
