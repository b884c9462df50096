//! Validation rounds and the validity indicator.
//!
//! Every sentence change starts a round with a fresh, strictly increasing
//! id. A round asks the oracle `sentence([...])` and pulls answers until
//! one succeeds or the answers run out:
//!
//! | answers                          | status                     |
//! |----------------------------------|----------------------------|
//! | any solution                     | `Valid`                    |
//! | exhausted, no errored branch     | `Invalid`                  |
//! | exhausted after an errored branch| `Errored(Execution)`       |
//! | query refused                    | `Errored(NotReady/Parse)`  |
//! | nothing settled before timeout   | `Errored(Timeout)`         |
//!
//! An invalid round still current after settling also asks the grammar's
//! diagnosis predicate for the problems it can name.
//!
//! Rounds may finish out of order. Only the most recently issued round is
//! allowed to change the indicator; any other result is dropped. A round in
//! flight never downgrades the verdict already shown.
//!
//! Everything here runs on one thread: rounds are spawned with
//! [`tokio::task::spawn_local`] and shared state is never borrowed across
//! an await point.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use futures::StreamExt;
use koine_logic::Term;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::blocks::SequenceChanged;
use crate::config::EngineConfig;
use crate::diagnosis::{Diagnostic, diagnosis_goal};
use crate::oracle::{GrammarOracle, QueryError};

// =============================================================================
// Round Status
// =============================================================================

/// Why a round errored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ErrorReason {
    /// The grammar was not loaded when the round started.
    NotReady,
    /// The goal could not be parsed.
    Parse(String),
    /// Resolution raised an error.
    Execution(String),
    /// No answer arrived in time.
    Timeout,
}

impl fmt::Display for ErrorReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotReady => f.write_str("grammar not loaded"),
            Self::Parse(message) => write!(f, "malformed goal: {message}"),
            Self::Execution(message) => write!(f, "grammar error: {message}"),
            Self::Timeout => f.write_str("validation timed out"),
        }
    }
}

/// State of one validation round.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RoundStatus {
    /// Issued, no answer yet.
    Pending,
    /// The grammar accepts the sentence.
    Valid,
    /// The grammar has no proof for the sentence.
    Invalid,
    /// The oracle could not give an answer.
    Errored(ErrorReason),
}

impl RoundStatus {
    /// Returns true once the round has an answer.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// One validation attempt over a snapshot of the sentence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationRound {
    /// Strictly increasing round id.
    pub id: u64,
    /// The sentence this round checked.
    pub surfaces: Vec<String>,
    /// Outcome.
    pub status: RoundStatus,
    /// Problems the grammar named for an invalid sentence.
    pub diagnostics: Vec<Diagnostic>,
}

// =============================================================================
// Indicator
// =============================================================================

/// The verdict shown to the user.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Verdict {
    /// No round has settled yet.
    #[default]
    Unchecked,
    /// Latest settled round was valid.
    Valid,
    /// Latest settled round was invalid.
    Invalid,
    /// Latest settled round errored.
    Errored(ErrorReason),
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unchecked => f.write_str("unchecked"),
            Self::Valid => f.write_str("valid"),
            Self::Invalid => f.write_str("invalid"),
            Self::Errored(reason) => write!(f, "error ({reason})"),
        }
    }
}

/// Published validity state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Indicator {
    /// Verdict of the latest settled round.
    pub verdict: Verdict,
    /// Id of the round that produced the verdict (0 before any).
    pub round: u64,
    /// True while the latest issued round has not settled.
    pub in_flight: bool,
    /// Problems named for the sentence when the verdict is invalid.
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Default)]
struct RoundTracker {
    issued: u64,
    settled: u64,
}

impl RoundTracker {
    fn issue(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    fn is_latest(&self, id: u64) -> bool {
        id == self.issued
    }
}

// =============================================================================
// Coordinator
// =============================================================================

struct Inner {
    oracle: Rc<dyn GrammarOracle>,
    config: EngineConfig,
    tracker: RefCell<RoundTracker>,
    indicator: watch::Sender<Indicator>,
}

/// Drives validation rounds against an oracle. Cheap to clone; clones
/// share rounds and the indicator.
#[derive(Clone)]
pub struct Coordinator {
    inner: Rc<Inner>,
}

impl Coordinator {
    /// Creates a coordinator over `oracle`.
    #[must_use]
    pub fn new(oracle: Rc<dyn GrammarOracle>, config: EngineConfig) -> Self {
        let (indicator, _) = watch::channel(Indicator::default());
        Self {
            inner: Rc::new(Inner {
                oracle,
                config,
                tracker: RefCell::new(RoundTracker::default()),
                indicator,
            }),
        }
    }

    /// Returns the current indicator.
    #[must_use]
    pub fn indicator(&self) -> Indicator {
        self.inner.indicator.borrow().clone()
    }

    /// Subscribes to indicator updates.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<Indicator> {
        self.inner.indicator.subscribe()
    }

    /// Returns the id of the most recently issued round.
    #[must_use]
    pub fn latest_round(&self) -> u64 {
        self.inner.tracker.borrow().issued
    }

    /// Builds the goal that validates `surfaces`.
    #[must_use]
    pub fn goal_for(&self, surfaces: &[String]) -> String {
        let words = Term::list(surfaces.iter().map(|s| Term::atom(s)), Term::nil());
        Term::compound(&self.inner.config.sentence_predicate, vec![words]).to_string()
    }

    /// Runs one round to completion and returns it.
    ///
    /// The indicator only changes if no newer round was issued meanwhile.
    pub async fn validate_now(&self, surfaces: Vec<String>) -> ValidationRound {
        let id = self.inner.tracker.borrow_mut().issue();
        let goal = self.goal_for(&surfaces);
        debug!(round = id, %goal, "round issued");
        self.inner.indicator.send_modify(|ind| ind.in_flight = true);

        let status = match tokio::time::timeout(self.inner.config.query_timeout, self.evaluate(&goal)).await {
            Ok(status) => status,
            Err(_) => {
                warn!(round = id, timeout = ?self.inner.config.query_timeout, "round timed out");
                RoundStatus::Errored(ErrorReason::Timeout)
            }
        };

        let diagnostics = if status == RoundStatus::Invalid && self.inner.tracker.borrow().is_latest(id) {
            self.diagnose(&surfaces).await
        } else {
            Vec::new()
        };

        self.settle(id, &status, &diagnostics);
        ValidationRound {
            id,
            surfaces,
            status,
            diagnostics,
        }
    }

    /// Spawns a round on the current `LocalSet`.
    ///
    /// # Panics
    ///
    /// Panics if called outside a `LocalSet`.
    pub fn schedule(&self, surfaces: Vec<String>) -> JoinHandle<ValidationRound> {
        let this = self.clone();
        tokio::task::spawn_local(async move { this.validate_now(surfaces).await })
    }

    /// Schedules a round for every sentence change until the sender side
    /// closes.
    pub async fn run(&self, mut events: mpsc::UnboundedReceiver<SequenceChanged>) {
        while let Some(event) = events.recv().await {
            debug!(revision = event.revision, "sentence change received");
            self.schedule(event.surfaces);
        }
    }

    async fn evaluate(&self, goal: &str) -> RoundStatus {
        let mut answers = match self.inner.oracle.query(goal) {
            Ok(answers) => answers,
            Err(QueryError::NotReady) => return RoundStatus::Errored(ErrorReason::NotReady),
            Err(QueryError::Parse(error)) => {
                warn!(%goal, %error, "goal rejected");
                return RoundStatus::Errored(ErrorReason::Parse(error.to_string()));
            }
        };
        let mut first_error = None;
        while let Some(answer) = answers.next().await {
            match answer {
                Ok(_) => return RoundStatus::Valid,
                Err(error) => {
                    debug!(%goal, %error, "branch errored");
                    first_error.get_or_insert(error);
                }
            }
        }
        match first_error {
            Some(error) => {
                warn!(%goal, %error, "validation errored");
                RoundStatus::Errored(ErrorReason::Execution(error.to_string()))
            }
            None => RoundStatus::Invalid,
        }
    }

    /// Collects the distinct problems the diagnosis predicate names for
    /// `surfaces`. Errored branches and a timeout yield what was found
    /// before them.
    async fn diagnose(&self, surfaces: &[String]) -> Vec<Diagnostic> {
        let Some(predicate) = &self.inner.config.diagnosis_predicate else {
            return Vec::new();
        };
        let goal = diagnosis_goal(predicate, surfaces);
        let mut found = Vec::new();
        let search = async {
            let mut answers = match self.inner.oracle.query(&goal) {
                Ok(answers) => answers,
                Err(error) => {
                    debug!(%goal, %error, "diagnosis not started");
                    return;
                }
            };
            while let Some(answer) = answers.next().await {
                match answer {
                    Ok(bindings) => {
                        let problem = bindings.get("P").and_then(Diagnostic::parse);
                        if let Some(problem) = problem.filter(|p| !found.contains(p)) {
                            found.push(problem);
                        }
                    }
                    Err(error) => debug!(%goal, %error, "diagnosis branch errored"),
                }
            }
        };
        if tokio::time::timeout(self.inner.config.query_timeout, search).await.is_err() {
            debug!(%goal, found = found.len(), "diagnosis timed out");
        }
        found
    }

    fn settle(&self, id: u64, status: &RoundStatus, diagnostics: &[Diagnostic]) {
        let mut tracker = self.inner.tracker.borrow_mut();
        if !tracker.is_latest(id) {
            debug!(round = id, latest = tracker.issued, "round superseded");
            return;
        }
        tracker.settled = id;
        drop(tracker);

        let verdict = match status {
            RoundStatus::Valid => Verdict::Valid,
            RoundStatus::Invalid => Verdict::Invalid,
            RoundStatus::Errored(reason) => Verdict::Errored(reason.clone()),
            RoundStatus::Pending => return,
        };
        debug!(round = id, %verdict, "round settled");
        self.inner.indicator.send_replace(Indicator {
            verdict,
            round: id,
            in_flight: false,
            diagnostics: diagnostics.to_vec(),
        });
    }
}

impl fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tracker = self.inner.tracker.borrow();
        f.debug_struct("Coordinator")
            .field("config", &self.inner.config)
            .field("issued", &tracker.issued)
            .field("settled", &tracker.settled)
            .finish_non_exhaustive()
    }
}
