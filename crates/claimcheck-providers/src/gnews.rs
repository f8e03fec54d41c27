//! GNews search client
//!
//! Recent English coverage for a claim. Coverage alone is not a verdict, so
//! an `ok` record always carries `unknown` and only contributes sources.

use async_trait::async_trait;
use claimcheck_core::{
    Assessment, Evidence, SignalRecord, SignalSource, SignalStatus, SourceError, Verdict,
};
use reqwest::Client;
use serde_json::Value;
use url::Url;

use crate::http::{ensure_success, network_error, read_json};
use crate::settings::{ProviderSettings, GNEWS_TOKEN_VAR};
use crate::text::{join_sentences, round2};

const API_URL: &str = "https://gnews.io/api/v4/search";
const MAX_ARTICLES: usize = 5;
const SYNOPSIS_CHARS: usize = 220;

/// Placeholder values some feeds put where a URL should be.
const INVALID_URLS: [&str; 5] = ["", "invalid url", "null", "none", "n/a"];

#[derive(Debug, Clone, PartialEq)]
pub struct Article {
    pub title: String,
    pub url: String,
    pub source: String,
    pub description: String,
    pub published_at: Option<String>,
}

pub struct GNewsSource {
    name: String,
    http: Client,
    token: Option<String>,
}

impl GNewsSource {
    pub fn new(name: impl Into<String>, http: Client, settings: &ProviderSettings) -> Self {
        Self {
            name: name.into(),
            http,
            token: settings.gnews_token.clone(),
        }
    }

    async fn search(&self, query: &str, token: &str) -> Result<Vec<Article>, SourceError> {
        let max = MAX_ARTICLES.to_string();
        let response = self
            .http
            .get(API_URL)
            .query(&[
                ("q", query),
                ("token", token),
                ("lang", "en"),
                ("max", max.as_str()),
                ("sortby", "publishedAt"),
            ])
            .send()
            .await
            .map_err(network_error)?;
        let body = read_json(ensure_success(response).await?).await?;
        Ok(parse_articles(&body))
    }
}

#[async_trait]
impl SignalSource for GNewsSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn invoke(&self, claim: &str) -> Result<SignalRecord, SourceError> {
        let token = self
            .token
            .as_deref()
            .ok_or_else(|| SourceError::missing_credential(GNEWS_TOKEN_VAR))?;
        let articles = self.search(claim, token).await?;
        tracing::debug!(source = %self.name, articles = articles.len(), "GNews search complete");
        Ok(coverage_record(&self.name, &articles))
    }
}

/// Articles with a usable URL, at most [`MAX_ARTICLES`].
pub fn parse_articles(body: &Value) -> Vec<Article> {
    let Some(entries) = body.get("articles").and_then(Value::as_array) else {
        return Vec::new();
    };
    entries
        .iter()
        .take(MAX_ARTICLES)
        .filter_map(|entry| {
            let url = article_url(entry)?;
            let text = |key: &str| {
                entry
                    .get(key)
                    .and_then(Value::as_str)
                    .map(|s| s.trim().to_string())
                    .unwrap_or_default()
            };
            let source = entry
                .pointer("/source/name")
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .unwrap_or("Unknown")
                .to_string();
            Some(Article {
                title: text("title"),
                url,
                source,
                description: text("description"),
                published_at: entry
                    .get("publishedAt")
                    .and_then(Value::as_str)
                    .map(str::to_string),
            })
        })
        .collect()
}

/// First usable URL among the article's direct keys, its source block, then link fields.
fn article_url(entry: &Value) -> Option<String> {
    let direct = ["url", "article_url", "source_url", "weblink"]
        .iter()
        .filter_map(|key| entry.get(*key));
    let from_source = ["url", "origin", "domain"]
        .iter()
        .filter_map(|key| entry.get("source").and_then(|source| source.get(*key)));
    let links = ["link", "redirect"].iter().filter_map(|key| entry.get(*key));

    direct
        .chain(from_source)
        .chain(links)
        .filter_map(Value::as_str)
        .find_map(clean_url)
}

/// Usable http(s) URL, adding a scheme where one is missing.
pub fn clean_url(raw: &str) -> Option<String> {
    let candidate = raw.trim();
    if INVALID_URLS.contains(&candidate.to_lowercase().as_str()) {
        return None;
    }
    let candidate = if let Some(rest) = candidate.strip_prefix("//") {
        format!("https://{}", rest)
    } else if candidate.contains("://") {
        candidate.to_string()
    } else {
        format!("https://{}", candidate)
    };
    let parsed = Url::parse(&candidate).ok()?;
    let has_host = parsed.host_str().is_some_and(|host| !host.is_empty());
    if matches!(parsed.scheme(), "http" | "https") && has_host {
        Some(candidate)
    } else {
        None
    }
}

pub fn coverage_record(source: &str, articles: &[Article]) -> SignalRecord {
    if articles.is_empty() {
        return SignalRecord::new(source, SignalStatus::NoData, Assessment::Unrated, 0.2)
            .with_notes("GNews did not return recent coverage matching the claim.");
    }

    let evidence = articles
        .iter()
        .map(|article| {
            let summary = if article.description.is_empty() {
                &article.title
            } else {
                &article.description
            };
            Evidence::new(article.source.as_str(), article.url.as_str())
                .with_snippet(summary.as_str())
        })
        .collect();
    let synopsis = join_sentences(
        articles.iter().take(2).map(|article| {
            if article.description.is_empty() {
                article.title.as_str()
            } else {
                article.description.as_str()
            }
        }),
        SYNOPSIS_CHARS,
    );
    let confidence = round2(0.5 + articles.len().min(4) as f64 * 0.1);

    SignalRecord::ok(source, Assessment::Verdict(Verdict::Unknown), confidence)
        .with_evidence(evidence)
        .with_notes(synopsis)
}
