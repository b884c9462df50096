//! End-to-end validation scenarios over a custom grammar file.

use std::path::PathBuf;
use std::rc::Rc;

use koine_engine::{
    Coordinator, EngineConfig, ErrorReason, GrammarOracle, LogicSession, RoundStatus, Verdict,
};
use koine_foundation::{Word, WordType};
use koine_runtime::{RuntimeConfig, Session};

const ARTICLE_NOUN: &str = "
    :- dynamic word_type/2, translation/2, inflection/3.
    sentence([W1, W2]) :- word_type(W1, article), word_type(W2, noun).
";

fn grammar_file(name: &str, text: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("koine-{name}-{}.pl", std::process::id()));
    std::fs::write(&path, text).unwrap();
    path
}

async fn session_with(grammar: &PathBuf) -> Session {
    let mut session = Session::new(RuntimeConfig::default().with_grammar_file(grammar));
    session.load_grammar().await.unwrap();
    session
        .add_word(Word::new("ho", "the", WordType::Article))
        .unwrap();
    session
        .add_word(Word::new("anthropos", "human", WordType::Noun))
        .unwrap();
    session
}

async fn verdict_for(session: &mut Session, surfaces: &[&str]) -> RoundStatus {
    session.clear_blocks();
    for surface in surfaces {
        session.add_block(surface).unwrap();
    }
    session.check().await.status
}

#[tokio::test]
async fn article_noun_scenario() {
    let grammar = grammar_file("article-noun", ARTICLE_NOUN);
    let mut session = session_with(&grammar).await;

    assert_eq!(verdict_for(&mut session, &["ho", "anthropos"]).await, RoundStatus::Valid);
    assert_eq!(session.indicator().verdict, Verdict::Valid);
    assert_eq!(verdict_for(&mut session, &["anthropos", "ho"]).await, RoundStatus::Invalid);
    assert_eq!(session.indicator().verdict, Verdict::Invalid);

    std::fs::remove_file(grammar).ok();
}

#[tokio::test]
async fn unasserted_word_is_invalid_not_errored() {
    let oracle = LogicSession::default();
    oracle.load(ARTICLE_NOUN).await.unwrap();
    oracle.assert_fact("word_type(ho, article)").unwrap();
    oracle.assert_fact("word_type(anthropos, noun)").unwrap();
    let coordinator = Coordinator::new(Rc::new(oracle), EngineConfig::default());

    let round = coordinator
        .validate_now(vec!["ho".to_string(), "zeus".to_string()])
        .await;
    assert_eq!(round.status, RoundStatus::Invalid);
}

#[tokio::test]
async fn queries_before_load_are_not_ready() {
    let mut session = Session::new(RuntimeConfig::default());
    session
        .add_word(Word::new("ho", "the", WordType::Article))
        .unwrap();
    session.add_block("ho").unwrap();

    let round = session.settle().await.unwrap();
    assert_eq!(round.status, RoundStatus::Errored(ErrorReason::NotReady));
    assert_eq!(session.indicator().verdict, Verdict::Errored(ErrorReason::NotReady));

    session.load_grammar().await.unwrap();
    assert_ne!(session.check().await.status, RoundStatus::Errored(ErrorReason::NotReady));
}

#[tokio::test]
async fn reloading_a_grammar_is_idempotent() {
    let grammar = grammar_file("reload", ARTICLE_NOUN);
    let mut session = session_with(&grammar).await;

    let before_types = session.types("ho").await.unwrap();
    let before = verdict_for(&mut session, &["ho", "anthropos"]).await;
    let facts = session.fact_count();

    session.load_grammar().await.unwrap();
    session.load_grammar().await.unwrap();

    assert_eq!(session.types("ho").await.unwrap(), before_types);
    assert_eq!(verdict_for(&mut session, &["ho", "anthropos"]).await, before);
    assert_eq!(session.fact_count(), facts);

    std::fs::remove_file(grammar).ok();
}

#[tokio::test]
async fn broken_grammar_keeps_the_previous_one_out() {
    let grammar = grammar_file("broken", "sentence([X) :- .");
    let mut session = Session::new(RuntimeConfig::default().with_grammar_file(&grammar));
    assert!(session.load_grammar().await.is_err());
    assert!(session.grammar_error().is_some());
    assert!(!session.grammar_ready());
    std::fs::remove_file(grammar).ok();
}
