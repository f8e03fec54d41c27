//! VirusTotal URL reputation
//!
//! Scans up to five URLs found in the claim. The record's risk is the highest
//! per-URL risk; a failed lookup counts as at least medium.

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use claimcheck_core::{
    Assessment, Evidence, Risk, SignalRecord, SignalSource, SignalStatus, SourceError,
};
use futures::future::join_all;
use reqwest::{Client, StatusCode};
use serde_json::Value;

use crate::http::{ensure_success, network_error, read_json};
use crate::settings::{ProviderSettings, VIRUSTOTAL_KEY_VAR};
use crate::text::extract_urls;

const API_URL: &str = "https://www.virustotal.com/api/v3/urls";
const MAX_URLS: usize = 5;
const EVIDENCE_LABEL: &str = "VirusTotal URL scan";

/// `last_analysis_stats` of one URL.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnalysisStats {
    pub harmless: u64,
    pub malicious: u64,
    pub suspicious: u64,
    pub undetected: u64,
    pub timeout: u64,
}

impl AnalysisStats {
    pub fn risk(&self) -> Risk {
        if self.malicious > 0 {
            Risk::High
        } else if self.suspicious > 0 {
            Risk::Medium
        } else {
            Risk::Low
        }
    }

    fn issue(&self) -> String {
        let mut parts = Vec::new();
        if self.malicious > 0 {
            parts.push(format!("{} engines flagged malicious", self.malicious));
        }
        if self.suspicious > 0 {
            parts.push(format!("{} engines flagged suspicious", self.suspicious));
        }
        if self.timeout > 0 {
            parts.push(format!("{} engines timed out", self.timeout));
        }
        if parts.is_empty() {
            parts.push("No engines flagged the URL".to_string());
        }
        parts.join(", ")
    }
}

/// VirusTotal URL identifier: URL-safe base64 without padding.
pub fn url_id(url: &str) -> String {
    URL_SAFE_NO_PAD.encode(url.as_bytes())
}

pub fn parse_stats(body: &Value) -> AnalysisStats {
    let stats = body.pointer("/data/attributes/last_analysis_stats");
    let count = |key: &str| {
        stats
            .and_then(|stats| stats.get(key))
            .and_then(Value::as_u64)
            .unwrap_or(0)
    };
    AnalysisStats {
        harmless: count("harmless"),
        malicious: count("malicious"),
        suspicious: count("suspicious"),
        undetected: count("undetected"),
        timeout: count("timeout"),
    }
}

pub struct UrlReputationSource {
    name: String,
    http: Client,
    api_key: Option<String>,
}

impl UrlReputationSource {
    pub fn new(name: impl Into<String>, http: Client, settings: &ProviderSettings) -> Self {
        Self {
            name: name.into(),
            http,
            api_key: settings.virustotal_key.clone(),
        }
    }

    async fn lookup(&self, url: &str, key: &str) -> Result<AnalysisStats, SourceError> {
        let response = self
            .http
            .get(format!("{}/{}", API_URL, url_id(url)))
            .header("x-apikey", key)
            .send()
            .await
            .map_err(network_error)?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(SourceError::Http {
                status: StatusCode::NOT_FOUND.as_u16(),
                body: "No VirusTotal record for URL".to_string(),
            });
        }
        let body = read_json(ensure_success(response).await?).await?;
        Ok(parse_stats(&body))
    }
}

#[async_trait]
impl SignalSource for UrlReputationSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn invoke(&self, claim: &str) -> Result<SignalRecord, SourceError> {
        let urls: Vec<String> = extract_urls(claim).into_iter().take(MAX_URLS).collect();
        if urls.is_empty() {
            return Ok(no_urls_record(&self.name));
        }
        let key = self
            .api_key
            .as_deref()
            .ok_or_else(|| SourceError::missing_credential(VIRUSTOTAL_KEY_VAR))?;

        let lookups = join_all(urls.iter().map(|url| self.lookup(url, key))).await;
        let scans: Vec<(String, Result<AnalysisStats, SourceError>)> =
            urls.into_iter().zip(lookups).collect();
        tracing::debug!(source = %self.name, urls = scans.len(), "URL reputation scan complete");
        Ok(scan_record(&self.name, &scans))
    }
}

pub fn no_urls_record(source: &str) -> SignalRecord {
    SignalRecord::new(source, SignalStatus::NoData, Assessment::Risk(Risk::Low), 0.0)
        .with_notes("No URLs were provided in the submission.")
}

pub fn scan_record(
    source: &str,
    scans: &[(String, Result<AnalysisStats, SourceError>)],
) -> SignalRecord {
    let mut level = Risk::Low;
    let mut evidence = Vec::new();

    for (url, outcome) in scans {
        let (url_level, issue) = match outcome {
            Ok(stats) => (stats.risk(), stats.issue()),
            Err(err) => (Risk::Medium, format!("Lookup failed: {}", err)),
        };
        level = level.max(url_level);
        let snippet = format!("{}. Recommendation: {}", issue, recommendation(url_level));
        evidence.push(Evidence::new(EVIDENCE_LABEL, url.as_str()).with_snippet(snippet));
    }

    SignalRecord::ok(source, Assessment::Risk(level), level_confidence(level))
        .with_evidence(evidence)
        .with_notes(recommendation(level))
}

fn level_confidence(level: Risk) -> f64 {
    match level {
        Risk::Low => 0.4,
        Risk::Medium => 0.65,
        Risk::High => 0.9,
    }
}

fn recommendation(level: Risk) -> &'static str {
    match level {
        Risk::High => "Block the link and escalate for manual security review.",
        Risk::Medium => "Treat with caution; open only in a sandbox after validation.",
        Risk::Low => "No malicious verdicts detected; keep monitoring.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn url_id_has_no_padding() {
        assert_eq!(url_id("http://a.b"), "aHR0cDovL2EuYg");
        assert!(!url_id("https://example.com/x?y=1").contains('='));
    }

    #[test]
    fn stats_map_to_risk() {
        let body = json!({"data": {"attributes": {"last_analysis_stats":
            {"harmless": 60, "malicious": 0, "suspicious": 2, "undetected": 10, "timeout": 1}}}});
        let stats = parse_stats(&body);
        assert_eq!(stats.risk(), Risk::Medium);
        assert_eq!(
            stats.issue(),
            "2 engines flagged suspicious, 1 engines timed out"
        );
        assert_eq!(parse_stats(&json!({})).risk(), Risk::Low);
    }

    #[test]
    fn failed_lookup_raises_to_medium_and_urls_stay_verbatim() {
        let scans = vec![
            ("https://Clean.example/Path".to_string(), Ok(AnalysisStats::default())),
            (
                "http://unknown.example".to_string(),
                Err(SourceError::Http {
                    status: 404,
                    body: "No VirusTotal record for URL".into(),
                }),
            ),
        ];
        let record = scan_record("url_reputation", &scans);
        assert_eq!(record.assessment, Assessment::Risk(Risk::Medium));
        assert_eq!(record.confidence, 0.65);
        assert_eq!(record.evidence[0].url, "https://Clean.example/Path");
        assert_eq!(
            record.evidence[0].snippet.as_deref(),
            Some(
                "No engines flagged the URL. \
                 Recommendation: No malicious verdicts detected; keep monitoring."
            )
        );
        assert_eq!(
            record.evidence[1].snippet.as_deref(),
            Some(
                "Lookup failed: HTTP 404: No VirusTotal record for URL. \
                 Recommendation: Treat with caution; open only in a sandbox after validation."
            )
        );
    }

    #[test]
    fn malicious_is_high() {
        let stats = AnalysisStats {
            malicious: 3,
            ..AnalysisStats::default()
        };
        let record = scan_record("url_reputation", &[("http://bad.example".into(), Ok(stats))]);
        assert_eq!(record.assessment, Assessment::Risk(Risk::High));
        assert_eq!(record.confidence, 0.9);
        assert_eq!(
            record.evidence[0].snippet.as_deref(),
            Some(
                "3 engines flagged malicious. \
                 Recommendation: Block the link and escalate for manual security review."
            )
        );
    }

    #[tokio::test]
    async fn no_urls_is_no_data_even_without_key() {
        let settings = ProviderSettings::default();
        let source = UrlReputationSource::new("url_reputation", Client::new(), &settings);
        let record = source.invoke("Nothing to scan here").await.unwrap();
        assert_eq!(record.status, SignalStatus::NoData);
        assert_eq!(record.confidence, 0.0);
        assert_eq!(record.notes, "No URLs were provided in the submission.");
    }

    #[tokio::test]
    async fn urls_without_key_is_a_source_error() {
        let settings = ProviderSettings::default();
        let source = UrlReputationSource::new("url_reputation", Client::new(), &settings);
        let err = source.invoke("see http://x.example").await.unwrap_err();
        assert_eq!(err, SourceError::missing_credential("VT_API_KEY"));
    }
}
