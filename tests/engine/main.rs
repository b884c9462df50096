//! Integration tests for Layer 3: Engine
//!
//! Tests for the form index, the block sequence, fact synchronization and
//! validation rounds.

mod blocks;
mod index;
mod rounds;
