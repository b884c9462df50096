//! Engine configuration.

use std::time::Duration;

use koine_logic::DEFAULT_INFERENCE_LIMIT;

/// Default time a validation round may take before it is reported as
/// errored.
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Default name of the predicate a sentence is validated against.
pub const DEFAULT_SENTENCE_PREDICATE: &str = "sentence";

/// Default name of the predicate that explains why a sentence is invalid.
pub const DEFAULT_DIAGNOSIS_PREDICATE: &str = "diagnose";

/// Configuration shared by the oracle session and the coordinator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    /// Name of the one-argument predicate that accepts a valid sentence.
    pub sentence_predicate: String,
    /// Upper bound on a single validation round.
    pub query_timeout: Duration,
    /// Inference budget for a single query.
    pub max_inferences: u64,
    /// Name of the two-argument predicate asked for the problems of an
    /// invalid sentence, or `None` to skip diagnosis.
    pub diagnosis_predicate: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sentence_predicate: DEFAULT_SENTENCE_PREDICATE.to_string(),
            query_timeout: DEFAULT_QUERY_TIMEOUT,
            max_inferences: DEFAULT_INFERENCE_LIMIT,
            diagnosis_predicate: Some(DEFAULT_DIAGNOSIS_PREDICATE.to_string()),
        }
    }
}

impl EngineConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the sentence predicate name.
    #[must_use]
    pub fn with_sentence_predicate(mut self, name: impl Into<String>) -> Self {
        self.sentence_predicate = name.into();
        self
    }

    /// Sets the per-round timeout.
    #[must_use]
    pub const fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = timeout;
        self
    }

    /// Sets the per-query inference budget.
    #[must_use]
    pub const fn with_max_inferences(mut self, limit: u64) -> Self {
        self.max_inferences = limit;
        self
    }

    /// Sets the diagnosis predicate name.
    #[must_use]
    pub fn with_diagnosis_predicate(mut self, name: impl Into<String>) -> Self {
        self.diagnosis_predicate = Some(name.into());
        self
    }

    /// Turns off diagnosis of invalid sentences.
    #[must_use]
    pub fn without_diagnosis(mut self) -> Self {
        self.diagnosis_predicate = None;
        self
    }
}
