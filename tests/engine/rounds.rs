//! Integration tests for validation rounds
//!
//! Tests the coordinator over the bundled grammar with facts kept in step
//! with a word store, and out-of-order completion of overlapping rounds.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use async_trait::async_trait;
use futures::{StreamExt, stream};
use koine_engine::{
    AnswerStream, AssertError, BlockSequence, Coordinator, Diagnostic, EngineConfig, ErrorReason, FactSync,
    FormIndex, GrammarOracle, LoadError, LogicSession, QueryError, RoundStatus, Verdict,
};
use koine_foundation::{Word, WordId, WordType};
use koine_storage::WordStore;
use tokio::task::LocalSet;

fn vocabulary() -> Vec<Word> {
    vec![
        Word::new("ὁ", "the", WordType::Article),
        Word::new("ἄνθρωπος", "human", WordType::Noun)
            .with_inflection("ἀνθρώπου", "Genitive Singular")
            .with_inflection("ἄνθρωπον", "Accusative Singular"),
        Word::new("θεός", "god", WordType::Noun)
            .with_inflection("θεόν", "Accusative Singular"),
        Word::new("λέγω", "I say", WordType::Verb)
            .with_inflection("λέγει", "Present Indicative Active 3rd Person Singular")
            .with_inflection("λέγουσι", "Present Indicative Active 3rd Person Plural"),
    ]
}

/// A store whose words are mirrored into a loaded logic session.
async fn wired() -> (WordStore, Rc<LogicSession>) {
    let oracle = Rc::new(LogicSession::default());
    oracle.load(koine_stdlib::GRAMMAR).await.unwrap();

    let mut store = WordStore::new();
    let sync = Rc::new(RefCell::new(FactSync::new()));
    let (listener_oracle, listener_sync) = (Rc::clone(&oracle), Rc::clone(&sync));
    store.on_change(move |event| {
        listener_sync
            .borrow_mut()
            .sync(listener_oracle.as_ref(), event.words.iter());
    });
    for word in vocabulary() {
        store.create(word).unwrap();
    }
    (store, oracle)
}

fn sentence(index: &FormIndex, surfaces: &[&str]) -> BlockSequence {
    let mut seq = BlockSequence::new();
    for surface in surfaces {
        seq.append(index.exact(surface)[0].clone());
    }
    seq
}

// =============================================================================
// Bundled Grammar
// =============================================================================

#[tokio::test]
async fn word_order_is_free_but_agreement_is_not() {
    let (store, oracle) = wired().await;
    let index = FormIndex::build(store.iter());
    let coordinator = Coordinator::new(oracle, EngineConfig::default());

    let cases: &[(&[&str], RoundStatus)] = &[
        (&["ὁ", "ἄνθρωπος", "λέγει"], RoundStatus::Valid),
        (&["λέγει", "ὁ", "ἄνθρωπος"], RoundStatus::Valid),
        (&["ὁ", "ἄνθρωπος", "λέγει", "θεόν"], RoundStatus::Valid),
        (&["ὁ", "ἄνθρωπος", "λέγουσι"], RoundStatus::Invalid),
        (&["ὁ", "ἄνθρωπος"], RoundStatus::Invalid),
        (&["ἄνθρωπος", "ὁ", "λέγει"], RoundStatus::Invalid),
    ];
    for (words, expected) in cases {
        let seq = sentence(&index, words);
        let round = coordinator.validate_now(seq.surfaces()).await;
        assert_eq!(&round.status, expected, "{words:?}");
    }
}

#[tokio::test]
async fn deleting_a_word_invalidates_sentences_using_it() {
    let (mut store, oracle) = wired().await;
    let coordinator = Coordinator::new(oracle, EngineConfig::default());
    let words = vec!["ὁ".to_string(), "θεός".to_string(), "λέγει".to_string()];

    assert_eq!(coordinator.validate_now(words.clone()).await.status, RoundStatus::Valid);
    store.delete(&WordId::new("θεός", "god")).unwrap();
    assert_eq!(coordinator.validate_now(words).await.status, RoundStatus::Invalid);
}

#[tokio::test]
async fn invalid_rounds_name_their_problems() {
    let (store, oracle) = wired().await;
    let index = FormIndex::build(store.iter());
    let coordinator = Coordinator::new(oracle, EngineConfig::default());
    let problem = |code: &str, words: &[&str]| {
        Diagnostic::new(code, words.iter().map(ToString::to_string).collect())
    };

    let cases: &[(&[&str], Vec<Diagnostic>)] = &[
        (&["ὁ", "ἄνθρωπος"], vec![problem("missing_verb", &[])]),
        (
            &["ὁ", "ἀνθρώπου", "λέγει"],
            vec![problem("agreement", &["ὁ", "ἀνθρώπου"])],
        ),
        (
            &["ὁ", "ἄνθρωπος", "λέγουσι"],
            vec![problem("subject_agreement", &["ἄνθρωπος", "λέγουσι"])],
        ),
        (&["ὁ", "ἄνθρωπος", "λέγει"], vec![]),
    ];
    for (words, expected) in cases {
        let round = coordinator.validate_now(sentence(&index, words).surfaces()).await;
        assert_eq!(&round.diagnostics, expected, "{words:?}");
    }

    let unknown = coordinator.validate_now(words(&["ὁ", "Ζεύς"])).await;
    assert_eq!(unknown.status, RoundStatus::Invalid);
    assert_eq!(
        unknown.diagnostics,
        vec![problem("unknown_word", &["Ζεύς"]), problem("missing_verb", &[])]
    );
    assert_eq!(coordinator.indicator().diagnostics, unknown.diagnostics);
}

#[tokio::test]
async fn endless_grammar_times_out() {
    let config = EngineConfig::default()
        .with_max_inferences(50_000_000)
        .with_query_timeout(Duration::from_millis(20));
    let oracle = Rc::new(LogicSession::new(&config));
    oracle
        .load("sentence(X) :- spin(X).\nspin(X) :- spin(X).")
        .await
        .unwrap();
    let coordinator = Coordinator::new(oracle, config);

    let round = coordinator.validate_now(words(&["a"])).await;
    assert_eq!(round.status, RoundStatus::Errored(ErrorReason::Timeout));
    assert_eq!(
        coordinator.indicator().verdict,
        Verdict::Errored(ErrorReason::Timeout)
    );
}

#[tokio::test]
async fn sentence_changes_drive_rounds() {
    let (store, oracle) = wired().await;
    let index = FormIndex::build(store.iter());
    let coordinator = Coordinator::new(oracle, EngineConfig::default());
    let mut indicator = coordinator.watch();

    let mut seq = BlockSequence::new();
    let changes = seq.subscribe();

    LocalSet::new()
        .run_until(async move {
            let runner = coordinator.clone();
            tokio::task::spawn_local(async move { runner.run(changes).await });

            for surface in ["ὁ", "ἄνθρωπος", "λέγει"] {
                seq.append(index.exact(surface)[0].clone());
            }
            loop {
                indicator.changed().await.unwrap();
                let current = indicator.borrow_and_update().clone();
                if current.round == 3 && !current.in_flight {
                    assert_eq!(current.verdict, Verdict::Valid);
                    break;
                }
            }
            assert_eq!(coordinator.latest_round(), 3);
        })
        .await;
}

// =============================================================================
// Overlapping Rounds
// =============================================================================

/// Wraps a logic session and holds each query's answers back for a
/// scripted delay.
struct SlowOracle {
    inner: LogicSession,
    delays: RefCell<VecDeque<Duration>>,
}

#[async_trait(?Send)]
impl GrammarOracle for SlowOracle {
    async fn load(&self, program: &str) -> Result<(), LoadError> {
        self.inner.load(program).await
    }

    fn assert_fact(&self, fact: &str) -> Result<(), AssertError> {
        self.inner.assert_fact(fact)
    }

    fn retract(&self, pattern: &str) -> Result<usize, AssertError> {
        self.inner.retract(pattern)
    }

    fn query(&self, goal: &str) -> Result<AnswerStream, QueryError> {
        let answers = self.inner.query(goal)?;
        let delay = self.delays.borrow_mut().pop_front().unwrap_or_default();
        let delayed = stream::once(async move {
            tokio::time::sleep(delay).await;
            answers
        })
        .flatten();
        Ok(Box::pin(delayed))
    }

    fn is_ready(&self) -> bool {
        self.inner.is_ready()
    }
}

async fn slow_oracle(delays: &[u64]) -> Rc<SlowOracle> {
    let oracle = SlowOracle {
        inner: LogicSession::default(),
        delays: RefCell::new(delays.iter().map(|ms| Duration::from_millis(*ms)).collect()),
    };
    oracle
        .load("sentence([ok]).\nsentence([ok, ok]).")
        .await
        .unwrap();
    Rc::new(oracle)
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(ToString::to_string).collect()
}

#[tokio::test(start_paused = true)]
async fn slow_stale_round_cannot_overwrite_newer_verdict() {
    let oracle = slow_oracle(&[500, 10]).await;
    let coordinator = Coordinator::new(oracle, EngineConfig::default());

    LocalSet::new()
        .run_until(async move {
            let stale = coordinator.schedule(words(&["ok"]));
            tokio::task::yield_now().await;
            let fresh = coordinator.schedule(words(&["ok", "nope"]));

            let fresh = fresh.await.unwrap();
            assert_eq!(fresh.status, RoundStatus::Invalid);
            assert_eq!(coordinator.indicator().verdict, Verdict::Invalid);

            let stale = stale.await.unwrap();
            assert_eq!(stale.status, RoundStatus::Valid);
            assert_eq!(coordinator.indicator().verdict, Verdict::Invalid);
            assert_eq!(coordinator.indicator().round, fresh.id);
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn slow_round_times_out() {
    let oracle = slow_oracle(&[10_000]).await;
    let config = EngineConfig::default().with_query_timeout(Duration::from_secs(1));
    let coordinator = Coordinator::new(oracle, config);

    let round = coordinator.validate_now(words(&["ok"])).await;
    assert_eq!(round.status, RoundStatus::Errored(ErrorReason::Timeout));
    assert_eq!(
        coordinator.indicator().verdict,
        Verdict::Errored(ErrorReason::Timeout)
    );
}
