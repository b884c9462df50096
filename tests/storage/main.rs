//! Integration tests for Layer 1: Storage
//!
//! Tests for the word store, review progress and store persistence.

mod persistence;
mod review;
mod store;
