//! Provider credentials and HTTP client settings.
//!
//! Credentials come from the environment. A missing key is not an error
//! here: the affected source reports an `error` record on every call.

use reqwest::Client;
use std::time::Duration;

use crate::error::ProviderError;

pub const GNEWS_TOKEN_VAR: &str = "GNEWS_API_TOKEN";
pub const FACT_CHECK_KEY_VAR: &str = "GOOGLE_FACT_CHECK_API_KEY";
pub const VIRUSTOTAL_KEY_VAR: &str = "VT_API_KEY";
pub const PERPLEXITY_KEY_VAR: &str = "PERPLEXITY_API_KEY";
pub const PERPLEXITY_MODEL_VAR: &str = "PERPLEXITY_MODEL";

/// Default Perplexity model
pub const DEFAULT_PERPLEXITY_MODEL: &str = "sonar-pro";

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub gnews_token: Option<String>,
    pub fact_check_key: Option<String>,
    pub virustotal_key: Option<String>,
    pub perplexity_key: Option<String>,
    pub perplexity_model: String,
    pub http_timeout: Duration,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            gnews_token: None,
            fact_check_key: None,
            virustotal_key: None,
            perplexity_key: None,
            perplexity_model: DEFAULT_PERPLEXITY_MODEL.to_string(),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }
}

impl ProviderSettings {
    /// Read every credential from the environment; blank values count as unset.
    pub fn from_env() -> Self {
        Self {
            gnews_token: env_value(GNEWS_TOKEN_VAR),
            fact_check_key: env_value(FACT_CHECK_KEY_VAR),
            virustotal_key: env_value(VIRUSTOTAL_KEY_VAR),
            perplexity_key: env_value(PERPLEXITY_KEY_VAR),
            perplexity_model: env_value(PERPLEXITY_MODEL_VAR)
                .unwrap_or_else(|| DEFAULT_PERPLEXITY_MODEL.to_string()),
            ..Self::default()
        }
    }

    pub fn with_http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = timeout;
        self
    }

    /// Names of the credentials that are not configured.
    pub fn missing_credentials(&self) -> Vec<&'static str> {
        [
            (GNEWS_TOKEN_VAR, &self.gnews_token),
            (FACT_CHECK_KEY_VAR, &self.fact_check_key),
            (VIRUSTOTAL_KEY_VAR, &self.virustotal_key),
            (PERPLEXITY_KEY_VAR, &self.perplexity_key),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_none())
        .map(|(name, _)| name)
        .collect()
    }

    /// Shared HTTP client for every provider.
    pub fn http_client(&self) -> Result<Client, ProviderError> {
        Client::builder()
            .timeout(self.http_timeout)
            .user_agent(concat!("claimcheck/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ProviderError::HttpClient(e.to_string()))
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
