//! In-process grammar oracle backed by the `koine_logic` solver.

use std::cell::RefCell;

use async_trait::async_trait;
use futures::stream;
use koine_logic::{Database, Program, Query, Solution, Solver, Step};
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::oracle::{AnswerStream, AssertError, Binding, Bindings, GrammarOracle, LoadError, QueryError};

/// Inferences a query runs before yielding to the scheduler.
const SLICE_INFERENCES: u64 = 4_096;

/// A logic session: one clause database owned by the engine and shared by
/// handle.
///
/// Program clauses and asserted facts are held apart, so loading a new
/// program keeps every asserted fact. Each query solves over a snapshot of
/// the database taken when it starts.
#[derive(Debug)]
pub struct LogicSession {
    db: RefCell<Database>,
    ready: RefCell<bool>,
    max_inferences: u64,
}

impl Default for LogicSession {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl LogicSession {
    /// Creates a session with no program loaded.
    #[must_use]
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            db: RefCell::new(Database::new()),
            ready: RefCell::new(false),
            max_inferences: config.max_inferences,
        }
    }

    /// Returns the number of asserted facts.
    #[must_use]
    pub fn fact_count(&self) -> usize {
        self.db.borrow().fact_count()
    }

    /// Returns the number of program clauses.
    #[must_use]
    pub fn clause_count(&self) -> usize {
        self.db.borrow().program().clause_count()
    }

    fn check_ready(&self) -> Result<(), AssertError> {
        if *self.ready.borrow() {
            Ok(())
        } else {
            Err(AssertError::NotReady)
        }
    }
}

fn bindings_of(solution: Solution) -> Bindings {
    Bindings::new(
        solution
            .iter()
            .map(|(name, value)| Binding {
                variable_name: name.to_string(),
                value: value.to_string(),
            })
            .collect(),
    )
}

#[async_trait(?Send)]
impl GrammarOracle for LogicSession {
    async fn load(&self, program: &str) -> Result<(), LoadError> {
        let program = Program::parse(program).inspect_err(|error| {
            warn!(%error, "grammar program rejected");
        })?;
        info!(
            clauses = program.clause_count(),
            predicates = program.predicates().len(),
            "grammar loaded"
        );
        self.db.borrow_mut().load(program);
        *self.ready.borrow_mut() = true;
        Ok(())
    }

    fn assert_fact(&self, fact: &str) -> Result<(), AssertError> {
        self.check_ready()?;
        self.db.borrow_mut().assert_source(fact)?;
        Ok(())
    }

    fn retract(&self, pattern: &str) -> Result<usize, AssertError> {
        self.check_ready()?;
        Ok(self.db.borrow_mut().retract_source(pattern)?)
    }

    fn query(&self, goal: &str) -> Result<AnswerStream, QueryError> {
        if !*self.ready.borrow() {
            return Err(QueryError::NotReady);
        }
        let query = Query::parse(goal)?;
        debug!(%goal, "query started");
        let solver = Solver::new(&self.db.borrow(), &query, self.max_inferences);
        let answers = stream::unfold(solver, |mut solver| async move {
            loop {
                match solver.resume(SLICE_INFERENCES) {
                    Step::Answer(answer) => return Some((answer.map(bindings_of), solver)),
                    Step::Exhausted => return None,
                    Step::Paused => tokio::task::yield_now().await,
                }
            }
        });
        Ok(Box::pin(answers))
    }

    fn is_ready(&self) -> bool {
        *self.ready.borrow()
    }
}
