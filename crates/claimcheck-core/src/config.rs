//! Engine configuration
//!
//! Loaded from YAML; every field has a default so an empty document is valid.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{EngineError, EngineResult};

/// Default per-source call timeout
const DEFAULT_SOURCE_TIMEOUT_MS: u64 = 15_000;

/// Default soft bound on signal record notes
const DEFAULT_MAX_NOTES_CHARS: usize = 600;

/// Outcome of a tie between the top truth classes in a news/fact tally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TiePolicy {
    /// Conflicting classes with equal support yield `mixed`.
    #[default]
    Mixed,
    /// Conflicting classes with equal support yield `unknown`.
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Per-source call timeout; a late source becomes an `error` record.
    pub source_timeout_ms: u64,
    pub tie_policy: TiePolicy,
    pub max_notes_chars: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            source_timeout_ms: DEFAULT_SOURCE_TIMEOUT_MS,
            tie_policy: TiePolicy::default(),
            max_notes_chars: DEFAULT_MAX_NOTES_CHARS,
        }
    }
}

impl EngineConfig {
    /// Load configuration from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> EngineResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_yaml(&content)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml(content: &str) -> EngineResult<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: EngineConfig =
            serde_yaml::from_str(content).map_err(|e| EngineError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> EngineResult<()> {
        if self.source_timeout_ms == 0 {
            return Err(EngineError::Config(
                "source_timeout_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn source_timeout(&self) -> Duration {
        Duration::from_millis(self.source_timeout_ms)
    }

    pub fn with_source_timeout(mut self, timeout: Duration) -> Self {
        self.source_timeout_ms = timeout.as_millis().max(1) as u64;
        self
    }

    pub fn with_tie_policy(mut self, policy: TiePolicy) -> Self {
        self.tie_policy = policy;
        self
    }
}
