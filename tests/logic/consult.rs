//! Integration tests for consulting programs
//!
//! Tests program parsing, directives, and how facts live beside programs.

use koine_logic::{ConsultError, Database, Program, Query};

fn answers(db: &Database, goal: &str) -> Vec<String> {
    db.solve(&Query::parse(goal).unwrap())
        .map(|r| r.unwrap().to_string())
        .collect()
}

// =============================================================================
// Programs
// =============================================================================

#[test]
fn program_counts_clauses() {
    let program = Program::parse(
        "
        :- dynamic word_type/2.
        greeting(χαῖρε).
        greeting(εἰρήνη).
        polite(W) :- greeting(W).
        ",
    )
    .unwrap();
    assert_eq!(program.clause_count(), 3);
}

#[test]
fn syntax_errors_name_the_line() {
    let err = Program::parse("ok(a).\nbroken(b.\n").unwrap_err();
    assert!(matches!(err, ConsultError::Syntax(_)));
    assert!(err.to_string().contains("line 2"));
}

#[test]
fn builtins_cannot_be_redefined() {
    let err = Program::parse("atom(x).").unwrap_err();
    assert!(matches!(err, ConsultError::Permission(_)));
}

#[test]
fn unknown_directives_are_rejected() {
    let err = Program::parse(":- initialization(main).").unwrap_err();
    assert!(matches!(err, ConsultError::Directive(_)));
}

#[test]
fn program_definitions_shadow_the_library() {
    let mut db = Database::new();
    db.load(Program::parse("member(only, _).").unwrap());
    assert_eq!(answers(&db, "member(X, [a, b])"), vec!["X = only"]);
}

// =============================================================================
// Facts
// =============================================================================

#[test]
fn dynamic_predicates_start_empty() {
    let mut db = Database::new();
    db.load(Program::parse(":- dynamic word_type/2.").unwrap());
    assert!(answers(&db, "word_type(X, noun)").is_empty());
}

#[test]
fn reloading_keeps_asserted_facts() {
    let mut db = Database::new();
    let source = ":- dynamic word_type/2.\nnoun(W) :- word_type(W, noun).";
    db.load(Program::parse(source).unwrap());
    db.assert_source("word_type(λόγος, noun)").unwrap();

    db.load(Program::parse(source).unwrap());
    assert_eq!(db.fact_count(), 1);
    assert_eq!(answers(&db, "noun(W)"), vec!["W = λόγος"]);
}

#[test]
fn retract_removes_every_match() {
    let mut db = Database::new();
    db.load(Program::parse(":- dynamic word_type/2.").unwrap());
    db.assert_source("word_type(λόγος, noun)").unwrap();
    db.assert_source("word_type(λόγου, noun)").unwrap();
    db.assert_source("word_type(λέγει, verb)").unwrap();

    assert_eq!(db.retract_source("word_type(_, noun)").unwrap(), 2);
    assert_eq!(answers(&db, "word_type(W, T)"), vec!["W = λέγει, T = verb"]);
    assert_eq!(db.retract_source("word_type(_, noun)").unwrap(), 0);
}

#[test]
fn asserting_a_rule_body_is_allowed() {
    let mut db = Database::new();
    db.load(Program::parse(":- dynamic likes/2.").unwrap());
    db.assert_source("likes(X, Y) :- X = Y").unwrap();
    assert_eq!(answers(&db, "likes(a, a)"), vec!["true"]);
}
