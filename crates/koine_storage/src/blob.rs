//! Store persistence using `MessagePack`.
//!
//! The store is saved as one opaque blob holding the word list and the
//! review progress. Nothing outside this module looks inside it.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use koine_foundation::{Error, ErrorKind, Result, Word};
use serde::{Deserialize, Serialize};

use crate::review::{ReviewCard, ReviewProgress};
use crate::store::WordStore;

/// Current blob layout version.
pub const BLOB_VERSION: u32 = 1;

/// Everything persisted between sessions.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreBlob {
    /// Layout version.
    pub version: u32,
    /// Registered words, in store order.
    pub words: Vec<Word>,
    /// Review progress cards.
    pub progress: Vec<ReviewCard>,
}

impl StoreBlob {
    /// Captures the given store and progress.
    #[must_use]
    pub fn capture(store: &WordStore, progress: &ReviewProgress) -> Self {
        Self {
            version: BLOB_VERSION,
            words: store.iter().cloned().collect(),
            progress: progress.cards().cloned().collect(),
        }
    }

    /// Splits the blob into a fresh store and progress.
    #[must_use]
    pub fn restore(self) -> (WordStore, ReviewProgress) {
        (
            WordStore::from_words(self.words),
            ReviewProgress::from_cards(self.progress),
        )
    }
}

/// Serializes a blob to bytes using `MessagePack` format.
///
/// Uses named serialization to preserve struct field names.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_bytes(blob: &StoreBlob) -> Result<Vec<u8>> {
    rmp_serde::to_vec_named(blob)
        .map_err(|e| Error::new(ErrorKind::SerializationError(e.to_string())))
}

/// Deserializes a blob from `MessagePack` bytes.
///
/// # Errors
///
/// Returns an error if deserialization fails or the layout version is
/// newer than this build understands.
pub fn from_bytes(bytes: &[u8]) -> Result<StoreBlob> {
    let blob: StoreBlob = rmp_serde::from_slice(bytes)
        .map_err(|e| Error::new(ErrorKind::SerializationError(e.to_string())))?;
    if blob.version > BLOB_VERSION {
        return Err(Error::new(ErrorKind::SerializationError(format!(
            "unsupported blob version {} (expected at most {BLOB_VERSION})",
            blob.version
        ))));
    }
    Ok(blob)
}

/// Saves a blob to a file, creating or overwriting it.
///
/// # Errors
///
/// Returns an error if the file cannot be written or serialization fails.
pub fn save_to_file<P: AsRef<Path>>(blob: &StoreBlob, path: P) -> Result<()> {
    let path = path.as_ref();
    let bytes = to_bytes(blob)?;
    let file = File::create(path).map_err(|e| {
        Error::new(ErrorKind::IoError(format!(
            "failed to create file '{}': {e}",
            path.display()
        )))
    })?;

    let mut writer = BufWriter::new(file);
    writer
        .write_all(&bytes)
        .and_then(|()| writer.flush())
        .map_err(|e| {
            Error::new(ErrorKind::IoError(format!(
                "failed to write to file '{}': {e}",
                path.display()
            )))
        })
}

/// Loads a blob from a file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or deserialization fails.
pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<StoreBlob> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        Error::new(ErrorKind::IoError(format!(
            "failed to open file '{}': {e}",
            path.display()
        )))
    })?;

    let mut bytes = Vec::new();
    BufReader::new(file).read_to_end(&mut bytes).map_err(|e| {
        Error::new(ErrorKind::IoError(format!(
            "failed to read file '{}': {e}",
            path.display()
        )))
    })?;

    from_bytes(&bytes)
}
