//! Integration tests for Layer 2: Logic
//!
//! Tests consulting programs and solving goals through the public API.

mod consult;
mod solving;
