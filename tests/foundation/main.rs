//! Integration tests for Layer 0: Foundation
//!
//! Tests for core types: Word, WordForm, WordType and Error.

mod errors;
mod words;
