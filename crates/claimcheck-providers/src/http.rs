//! Response handling shared by the HTTP-backed sources.

use claimcheck_core::SourceError;
use reqwest::Response;
use serde_json::Value;

/// Error bodies are cut to this many characters before they reach notes.
const MAX_ERROR_BODY_CHARS: usize = 200;

pub(crate) fn network_error(err: reqwest::Error) -> SourceError {
    if err.is_timeout() {
        SourceError::Network(format!("request timed out: {}", err))
    } else {
        SourceError::Network(err.to_string())
    }
}

/// Non-2xx responses become [`SourceError::Http`] with a truncated body.
pub(crate) async fn ensure_success(response: Response) -> Result<Response, SourceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(SourceError::Http {
        status: status.as_u16(),
        body: body.trim().chars().take(MAX_ERROR_BODY_CHARS).collect(),
    })
}

pub(crate) async fn read_json(response: Response) -> Result<Value, SourceError> {
    response
        .json::<Value>()
        .await
        .map_err(|e| SourceError::Parse(e.to_string()))
}
