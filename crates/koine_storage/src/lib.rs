//! Word store, change notification, persistence, and review progress for Koine.
//!
//! This crate provides:
//! - [`WordStore`] - Keyed CRUD over registered words with change listeners
//! - [`blob`] - `MessagePack` encoding of the store for persistence
//! - [`review`] - Leitner-box flashcard progress and review sessions

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod blob;
pub mod review;
pub mod store;

pub use blob::StoreBlob;
pub use review::{Grade, ReviewCard, ReviewProgress, ReviewSession};
pub use store::{ListenerId, StoreChange, StoreEvent, WordStore};
