//! Integration tests for Error types
//!
//! Tests error construction, display, context, and severity.

use koine_foundation::{Error, ErrorKind, Severity, WordId};

// =============================================================================
// Error Construction
// =============================================================================

#[test]
fn error_out_of_range() {
    let err = Error::out_of_range(4, 2);
    assert!(err.is_out_of_range());
    let msg = format!("{err}");
    assert!(msg.contains('4'));
    assert!(msg.contains('2'));
}

#[test]
fn error_word_not_found() {
    let err = Error::word_not_found(&WordId::new("λόγος", "word"));
    assert!(matches!(err.kind, ErrorKind::WordNotFound(_)));
    assert!(format!("{err}").contains("λόγος"));
}

#[test]
fn error_unknown_form() {
    let err = Error::unknown_form("θεός");
    assert!(matches!(err.kind, ErrorKind::UnknownForm(_)));
    assert!(format!("{err}").contains("θεός"));
}

#[test]
fn error_unknown_inflection() {
    let err = Error::unknown_inflection("λόγος", "Vocative Plural");
    let msg = format!("{err}");
    assert!(msg.contains("λόγος"));
    assert!(msg.contains("Vocative Plural"));
}

// =============================================================================
// Context and Severity
// =============================================================================

#[test]
fn context_keeps_kind() {
    let err = Error::invalid_word("lemma must not be empty").with_context("create");
    assert!(matches!(err.kind, ErrorKind::InvalidWord(_)));
    assert_eq!(err.context.as_deref(), Some("create"));
}

#[test]
fn severity_by_kind() {
    assert_eq!(Error::unknown_form("x").kind.severity(), Severity::Degraded);
    assert_eq!(Error::out_of_range(1, 0).kind.severity(), Severity::Bug);
    assert_eq!(ErrorKind::Config("grammar".into()).severity(), Severity::Fatal);
}
