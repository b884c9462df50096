//! Error types for reading and running grammar programs.

use thiserror::Error;

use crate::span::Span;

/// Malformed source text.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("syntax error at line {line}, column {column}: {message}")]
pub struct SyntaxError {
    /// What went wrong.
    pub message: String,
    /// 1-based line of the offending token.
    pub line: u32,
    /// 1-based column of the offending token.
    pub column: u32,
}

impl SyntaxError {
    /// Creates a syntax error located at `span`.
    #[must_use]
    pub fn at(span: Span, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            line: span.line,
            column: span.column,
        }
    }
}

/// A program, fact, or pattern that could not be added to a database.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ConsultError {
    /// The text does not parse.
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    /// A clause head is a variable or a number.
    #[error("clause head is not callable: {0}")]
    NotCallable(String),

    /// A directive other than `dynamic` or `discontiguous`.
    #[error("unsupported directive: {0}")]
    Directive(String),

    /// An attempt to define or modify a built-in predicate.
    #[error("cannot modify built-in predicate {0}")]
    Permission(String),

    /// A grammar rule that cannot be translated.
    #[error("invalid grammar rule: {0}")]
    Grammar(String),
}

/// An error raised while proving a goal.
///
/// Raising an error abandons the branch of the search that raised it.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ExecutionError {
    /// Call to a predicate that is neither defined nor declared dynamic.
    #[error("unknown procedure {0}")]
    UnknownPredicate(String),

    /// An argument that must be bound was an unbound variable.
    #[error("arguments are not sufficiently instantiated in {0}")]
    Instantiation(String),

    /// An argument had the wrong kind of value.
    #[error("type error in {context}: expected {expected}, found {found}")]
    Type {
        /// The built-in that raised the error.
        context: String,
        /// Expected kind of value.
        expected: &'static str,
        /// The offending value.
        found: String,
    },

    /// Arithmetic failure such as division by zero or overflow.
    #[error("evaluation error: {0}")]
    Evaluation(String),

    /// The proof took more steps than the configured budget.
    #[error("inference limit of {0} exceeded")]
    InferenceLimit(u64),
}
