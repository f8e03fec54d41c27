use thiserror::Error;

use crate::model::Lane;

/// Failure of a single signal source invocation.
///
/// Never escapes a lane: the runner turns every variant into an `error`
/// signal record carrying the rendered message as its notes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    #[error("no claim text was supplied")]
    EmptyClaim,

    #[error("{var} environment variable is not configured")]
    MissingCredential { var: String },

    #[error("network failure: {0}")]
    Network(String),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("malformed response: {0}")]
    Parse(String),

    #[error("timed out after {after_ms} ms")]
    Timeout { after_ms: u64 },

    #[error("source task aborted: {0}")]
    Panicked(String),
}

impl SourceError {
    pub fn missing_credential(var: &str) -> Self {
        Self::MissingCredential {
            var: var.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("aggregation invariant violated for {lane} lane: {reason}")]
    AggregationInvariantViolation { lane: Lane, reason: String },

    #[error("assembly precondition failed: no lane verdict for {missing:?}")]
    AssemblyPrecondition { missing: Vec<Lane> },

    #[error("state key '{key}' already written")]
    AlreadyWritten { key: String },

    #[error("config error: {0}")]
    Config(String),
}

pub type EngineResult<T> = Result<T, EngineError>;
