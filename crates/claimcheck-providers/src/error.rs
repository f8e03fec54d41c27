use thiserror::Error;

/// Failure while wiring providers together (not while calling them).
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),

    #[error("invalid tone pattern: {0}")]
    Pattern(#[from] regex::Error),
}
