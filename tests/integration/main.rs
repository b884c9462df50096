//! Cross-layer integration tests for Koine
//!
//! Tests that verify correct interaction between multiple crates.

mod round_trip;
mod scenarios;
mod sessions;
