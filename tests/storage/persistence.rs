//! Integration tests for store persistence
//!
//! Tests blob capture, restore and file round trips.

use chrono::NaiveDate;
use koine_foundation::{ErrorKind, Word, WordType};
use koine_storage::blob::{BLOB_VERSION, from_bytes, load_from_file, save_to_file, to_bytes};
use koine_storage::{ReviewProgress, StoreBlob, WordStore};

fn sample() -> (WordStore, ReviewProgress) {
    let words = vec![
        Word::new("λόγος", "word", WordType::Noun)
            .with_inflection("λόγου", "Genitive Singular"),
        Word::new("λέγω", "I say", WordType::Verb)
            .with_inflection("λέγει", "Present Indicative Active 3rd Person Singular"),
    ];
    let mut progress = ReviewProgress::new();
    let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    for word in &words {
        progress.enroll(word.id(), today);
    }
    (WordStore::from_words(words), progress)
}

#[test]
fn blob_survives_bytes() {
    let (store, progress) = sample();
    let blob = StoreBlob::capture(&store, &progress);
    assert_eq!(blob.version, BLOB_VERSION);

    let decoded = from_bytes(&to_bytes(&blob).unwrap()).unwrap();
    assert_eq!(decoded, blob);

    let (restored, restored_progress) = decoded.restore();
    assert_eq!(restored.list(), store.list());
    assert_eq!(restored_progress, progress);
}

#[test]
fn blob_survives_a_file() {
    let path = std::env::temp_dir().join(format!("koine-storage-{}.store", std::process::id()));
    let (store, progress) = sample();
    save_to_file(&StoreBlob::capture(&store, &progress), &path).unwrap();
    let loaded = load_from_file(&path).unwrap();
    std::fs::remove_file(&path).ok();
    assert_eq!(loaded.words.len(), 2);
    assert_eq!(loaded.progress.len(), 2);
}

#[test]
fn garbage_is_a_serialization_error() {
    let err = from_bytes(&[0xc1, 0x00, 0x13]).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::SerializationError(_)));
}

#[test]
fn newer_blob_versions_are_rejected() {
    let blob = StoreBlob {
        version: BLOB_VERSION + 1,
        ..StoreBlob::default()
    };
    let err = from_bytes(&to_bytes(&blob).unwrap()).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::SerializationError(_)));
}

#[test]
fn missing_file_is_an_io_error() {
    let err = load_from_file("/nonexistent/koine.store").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::IoError(_)));
}
