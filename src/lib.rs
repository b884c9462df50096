//! Koine - Greek sentence builder with grammar checking
//!
//! This crate re-exports all layers of the Koine system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 4: koine_runtime    - REPL, CLI, session wiring, logging
//!          koine_stdlib     - Bundled grammar and inflection paradigms
//! Layer 3: koine_engine     - Form index, fact sync, blocks, validation rounds
//! Layer 2: koine_logic      - Clause parser, database, solver
//! Layer 1: koine_storage    - Word store, review progress, persistence
//! Layer 0: koine_foundation - Core types (Word, WordForm, Error)
//! ```

pub use koine_engine as engine;
pub use koine_foundation as foundation;
pub use koine_logic as logic;
pub use koine_runtime as runtime;
pub use koine_stdlib as stdlib;
pub use koine_storage as storage;
