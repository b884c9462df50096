//! Runtime configuration.

use std::path::PathBuf;
use std::time::Duration;

use koine_engine::EngineConfig;
use koine_foundation::{Error, ErrorKind, Result};

/// Default store file, relative to the working directory.
pub const DEFAULT_STORE_PATH: &str = "koine.store";

/// Default log filter when `KOINE_LOG` is not set.
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Where the grammar program comes from.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum GrammarSource {
    /// The grammar shipped with the application.
    #[default]
    Bundled,
    /// A grammar file on disk.
    File(PathBuf),
}

impl GrammarSource {
    /// Reads the program text.
    ///
    /// # Errors
    ///
    /// Returns `IoError` if the file cannot be read.
    pub async fn read(&self) -> Result<String> {
        match self {
            Self::Bundled => Ok(koine_stdlib::GRAMMAR.to_string()),
            Self::File(path) => tokio::fs::read_to_string(path).await.map_err(|e| {
                Error::new(ErrorKind::IoError(format!(
                    "failed to read grammar {}: {e}",
                    path.display()
                )))
            }),
        }
    }
}

/// Settings for one run of the application.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Grammar program to load at startup.
    pub grammar: GrammarSource,
    /// Store file used by `save` and `load` without a path.
    pub store_path: PathBuf,
    /// Seed for review shuffling.
    pub seed: u64,
    /// Log filter used when `KOINE_LOG` is not set.
    pub log_filter: String,
    /// Engine settings.
    pub engine: EngineConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            grammar: GrammarSource::Bundled,
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
            seed: 0,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            engine: EngineConfig::default(),
        }
    }
}

impl RuntimeConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses a grammar file instead of the bundled grammar.
    #[must_use]
    pub fn with_grammar_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.grammar = GrammarSource::File(path.into());
        self
    }

    /// Sets the store file.
    #[must_use]
    pub fn with_store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.store_path = path.into();
        self
    }

    /// Sets the review shuffle seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the default log filter.
    #[must_use]
    pub fn with_log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = filter.into();
        self
    }

    /// Sets the validation timeout.
    #[must_use]
    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.engine = self.engine.with_query_timeout(timeout);
        self
    }

    /// Replaces the engine settings.
    #[must_use]
    pub fn with_engine(mut self, engine: EngineConfig) -> Self {
        self.engine = engine;
        self
    }
}
