//! Integration tests for solving goals
//!
//! Tests lazy enumeration, grammar rules, quoting, and error isolation.

use koine_logic::{Database, ExecutionError, Program, Query, Solver, Term};

fn db(source: &str) -> Database {
    let mut db = Database::new();
    db.load(Program::parse(source).unwrap());
    db
}

fn answers(db: &Database, goal: &str) -> Vec<String> {
    db.solve(&Query::parse(goal).unwrap())
        .map(|r| r.unwrap().to_string())
        .collect()
}

const TOY: &str = "
    :- dynamic word_type/2.
    sentence(Words) :- phrase(s, Words).
    s --> np, vp.
    np --> [W], { word_type(W, article) }, [N], { word_type(N, noun) }.
    vp --> [V], { word_type(V, verb) }.
";

fn toy() -> Database {
    let mut db = db(TOY);
    for fact in [
        "word_type(ὁ, article)",
        "word_type(ἄνθρωπος, noun)",
        "word_type(λέγει, verb)",
        "word_type('Ζεύς', noun)",
    ] {
        db.assert_source(fact).unwrap();
    }
    db
}

// =============================================================================
// Grammar Rules
// =============================================================================

#[test]
fn grammar_accepts_and_rejects() {
    let db = toy();
    assert_eq!(answers(&db, "sentence([ὁ, ἄνθρωπος, λέγει])"), vec!["true"]);
    assert!(answers(&db, "sentence([ἄνθρωπος, ὁ, λέγει])").is_empty());
    assert!(answers(&db, "sentence([])").is_empty());
}

#[test]
fn quoted_atoms_match_their_unquoted_spelling() {
    let db = toy();
    assert_eq!(answers(&db, "sentence([ὁ, 'Ζεύς', λέγει])"), vec!["true"]);
    let goal = Term::compound(
        "sentence",
        vec![Term::list(
            ["ὁ", "Ζεύς", "λέγει"].into_iter().map(Term::atom),
            Term::nil(),
        )],
    );
    assert_eq!(answers(&db, &goal.to_string()), vec!["true"]);
}

#[test]
fn grammar_generates_sentences() {
    let db = toy();
    assert_eq!(
        answers(&db, "sentence(S)"),
        vec!["S = [ὁ,ἄνθρωπος,λέγει]", "S = [ὁ,'Ζεύς',λέγει]"]
    );
}

// =============================================================================
// Enumeration
// =============================================================================

#[test]
fn answers_are_pulled_one_at_a_time() {
    let db = db("count(0).\ncount(N) :- count(M), N is M + 1.");
    let mut solver = db.solve(&Query::parse("count(X)").unwrap());
    let first = solver.next().unwrap().unwrap();
    assert_eq!(first.get("X"), Some(&Term::Int(0)));
    let second = solver.next().unwrap().unwrap();
    assert_eq!(second.get("X"), Some(&Term::Int(1)));
}

#[test]
fn inference_limit_is_terminal() {
    let db = db("spin :- spin.");
    let results: Vec<_> = Solver::new(&db, &Query::parse("spin").unwrap(), 100).collect();
    assert_eq!(results, vec![Err(ExecutionError::InferenceLimit(100))]);
}

#[test]
fn an_error_abandons_only_its_branch() {
    let db = db("pick(a).\npick(X) :- missing(X).\npick(c).");
    let results: Vec<_> = db.solve(&Query::parse("pick(X)").unwrap()).collect();
    assert_eq!(results.len(), 3);
    assert!(results[0].is_ok());
    assert!(matches!(results[1], Err(ExecutionError::UnknownPredicate(_))));
    assert_eq!(results[2].as_ref().unwrap().to_string(), "X = c");
}

#[test]
fn snapshots_ignore_later_changes() {
    let mut db = toy();
    let query = Query::parse("word_type(W, verb)").unwrap();
    let solver = db.solve(&query);
    db.assert_source("word_type(γράφει, verb)").unwrap();
    assert_eq!(solver.count(), 1);
    assert_eq!(db.solve(&query).count(), 2);
}

#[test]
fn malformed_goals_fail_to_parse() {
    assert!(Query::parse("sentence([ὁ, ").is_err());
    assert!(Query::parse("").is_err());
}
