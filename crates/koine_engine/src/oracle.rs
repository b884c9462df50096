//! The grammar oracle interface.
//!
//! The engine talks to its logic backend only through [`GrammarOracle`]:
//! load a program, assert and retract facts, and ask goals. Answers come
//! back as a lazy stream of binding sets in engine order. The stream ending
//! is the normal "no more answers" signal; an `Err` item is one failed
//! branch, and later items may still succeed.

use std::fmt;

use async_trait::async_trait;
use futures::StreamExt;
use futures::stream::LocalBoxStream;
use koine_logic::{ConsultError, ExecutionError, SyntaxError};
use thiserror::Error;
use tracing::warn;

// =============================================================================
// Errors
// =============================================================================

/// Failure to load a grammar program.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LoadError {
    /// The program text could not be read into clauses.
    #[error("grammar program rejected: {0}")]
    Consult(#[from] ConsultError),
}

/// Failure to assert or retract a fact.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum AssertError {
    /// No program has been loaded yet.
    #[error("grammar not loaded yet")]
    NotReady,
    /// The fact text is malformed or not a valid clause.
    #[error("invalid fact: {0}")]
    Invalid(#[from] ConsultError),
}

/// Failure to start a query.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    /// No program has been loaded yet.
    #[error("grammar not loaded yet")]
    NotReady,
    /// The goal text is malformed.
    #[error("malformed goal: {0}")]
    Parse(#[from] SyntaxError),
}

// =============================================================================
// Bindings
// =============================================================================

/// One variable assignment from one proof.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Binding {
    /// Name of the query variable.
    pub variable_name: String,
    /// The bound value, written canonically.
    pub value: String,
}

/// The bindings of one solution, in query variable order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Bindings(Vec<Binding>);

impl Bindings {
    /// Creates a binding set.
    #[must_use]
    pub fn new(bindings: Vec<Binding>) -> Self {
        Self(bindings)
    }

    /// Returns the value bound to a variable.
    #[must_use]
    pub fn get(&self, variable: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|b| b.variable_name == variable)
            .map(|b| b.value.as_str())
    }

    /// Iterates the bindings.
    pub fn iter(&self) -> impl Iterator<Item = &Binding> {
        self.0.iter()
    }

    /// Returns the number of bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true for a solution of a goal with no named variables.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Bindings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("true");
        }
        for (i, binding) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{} = {}", binding.variable_name, binding.value)?;
        }
        Ok(())
    }
}

/// Lazy sequence of answers to one goal. Ends when answers are exhausted.
pub type AnswerStream = LocalBoxStream<'static, Result<Bindings, ExecutionError>>;

// =============================================================================
// Oracle
// =============================================================================

/// A logic backend that can load a grammar and answer goals.
///
/// `load`, `assert_fact` and `retract` change state seen by every later
/// query. Queries that are already running are not affected.
#[async_trait(?Send)]
pub trait GrammarOracle {
    /// Replaces the current rule program.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] if the program cannot be consulted. The
    /// previous program, if any, stays in place.
    async fn load(&self, program: &str) -> Result<(), LoadError>;

    /// Adds one fact after existing clauses of its predicate.
    ///
    /// # Errors
    ///
    /// Returns [`AssertError::NotReady`] before a program is loaded, or
    /// [`AssertError::Invalid`] for malformed facts.
    fn assert_fact(&self, fact: &str) -> Result<(), AssertError>;

    /// Removes every asserted clause matching `pattern`, returning how many
    /// were removed.
    ///
    /// # Errors
    ///
    /// Same conditions as [`assert_fact`](Self::assert_fact).
    fn retract(&self, pattern: &str) -> Result<usize, AssertError>;

    /// Starts answering `goal`.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::NotReady`] before a program is loaded, or
    /// [`QueryError::Parse`] for a malformed goal.
    fn query(&self, goal: &str) -> Result<AnswerStream, QueryError>;

    /// Returns true once a program has been loaded.
    fn is_ready(&self) -> bool;
}

/// Enumerates every value `variable` takes across all answers to `goal`,
/// in answer order. Errored branches are logged and skipped.
///
/// # Errors
///
/// Returns [`QueryError`] if the query cannot be started.
pub async fn collect(
    oracle: &dyn GrammarOracle,
    goal: &str,
    variable: &str,
) -> Result<Vec<String>, QueryError> {
    let mut answers = oracle.query(goal)?;
    let mut values = Vec::new();
    while let Some(answer) = answers.next().await {
        match answer {
            Ok(bindings) => {
                if let Some(value) = bindings.get(variable) {
                    values.push(value.to_string());
                }
            }
            Err(error) => warn!(%goal, %error, "skipping errored answer"),
        }
    }
    Ok(values)
}
