//! Google Fact Check Tools client
//!
//! Looks up published fact-check reviews of a claim. Each review's textual
//! rating is mapped onto the truth vocabulary; the record verdict is the
//! strict true/false majority across reviews.

use async_trait::async_trait;
use claimcheck_core::aggregate::{map_rating, VerdictTally};
use claimcheck_core::{
    Assessment, Evidence, SignalRecord, SignalSource, SignalStatus, SourceError, Verdict,
};
use reqwest::Client;
use serde_json::Value;

use crate::http::{ensure_success, network_error, read_json};
use crate::settings::{ProviderSettings, FACT_CHECK_KEY_VAR};
use crate::text::{join_sentences, round2};

const API_URL: &str = "https://factchecktools.googleapis.com/v1alpha1/claims:search";
const MAX_REVIEWS: usize = 6;
const SUMMARY_CHARS: usize = 240;

#[derive(Debug, Clone, PartialEq)]
pub struct Review {
    pub claim_text: String,
    pub publisher: String,
    pub url: String,
    pub title: String,
    pub rating: String,
    pub summary: String,
}

pub struct FactCheckSource {
    name: String,
    http: Client,
    api_key: Option<String>,
}

impl FactCheckSource {
    pub fn new(name: impl Into<String>, http: Client, settings: &ProviderSettings) -> Self {
        Self {
            name: name.into(),
            http,
            api_key: settings.fact_check_key.clone(),
        }
    }

    async fn search(&self, query: &str, key: &str) -> Result<Vec<Review>, SourceError> {
        let page_size = MAX_REVIEWS.to_string();
        let response = self
            .http
            .get(API_URL)
            .query(&[
                ("key", key),
                ("languageCode", "en-US"),
                ("pageSize", page_size.as_str()),
                ("query", query),
            ])
            .send()
            .await
            .map_err(network_error)?;
        let body = read_json(ensure_success(response).await?).await?;
        Ok(parse_reviews(&body))
    }
}

#[async_trait]
impl SignalSource for FactCheckSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn invoke(&self, claim: &str) -> Result<SignalRecord, SourceError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or_else(|| SourceError::missing_credential(FACT_CHECK_KEY_VAR))?;
        let reviews = self.search(claim, key).await?;
        tracing::debug!(source = %self.name, reviews = reviews.len(), "Fact-check lookup complete");
        Ok(review_record(&self.name, &reviews))
    }
}

/// Flatten `claims[].claimReview[]`, at most [`MAX_REVIEWS`].
pub fn parse_reviews(body: &Value) -> Vec<Review> {
    let text = |value: &Value, key: &str| {
        value
            .get(key)
            .and_then(Value::as_str)
            .map(|s| s.trim().to_string())
            .unwrap_or_default()
    };

    let mut reviews = Vec::new();
    for claim in body
        .get("claims")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
    {
        let claim_text = text(claim, "text");
        for review in claim
            .get("claimReview")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
        {
            let publisher = review
                .pointer("/publisher/name")
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .unwrap_or("Unknown")
                .to_string();
            let title = Some(text(review, "title"))
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| claim_text.clone());
            reviews.push(Review {
                claim_text: claim_text.clone(),
                publisher,
                url: text(review, "url"),
                title,
                rating: text(review, "textualRating"),
                summary: text(review, "text"),
            });
        }
    }
    reviews.truncate(MAX_REVIEWS);
    reviews
}

/// `true` or `false` only on a strict majority; otherwise `unknown`.
pub fn majority_verdict(reviews: &[Review]) -> Verdict {
    let tally =
        VerdictTally::from_verdicts(reviews.iter().map(|review| map_rating(&review.rating)));
    if tally.false_votes > tally.true_votes {
        Verdict::False
    } else if tally.true_votes > tally.false_votes {
        Verdict::True
    } else {
        Verdict::Unknown
    }
}

pub fn review_record(source: &str, reviews: &[Review]) -> SignalRecord {
    if reviews.is_empty() {
        return SignalRecord::new(source, SignalStatus::NoData, Assessment::Unrated, 0.2)
            .with_notes("No fact-check entries matched the submitted claim.");
    }

    let evidence = reviews
        .iter()
        .map(|review| {
            let rating = if review.rating.is_empty() {
                "Unrated"
            } else {
                review.rating.as_str()
            };
            let detail = if review.summary.is_empty() {
                &review.claim_text
            } else {
                &review.summary
            };
            let snippet = if detail.is_empty() {
                format!("Rated {}", rating)
            } else {
                format!("Rated {}: {}", rating, detail)
            };
            Evidence::new(review.publisher.as_str(), review.url.as_str()).with_snippet(snippet)
        })
        .collect();
    let notes = join_sentences(
        reviews.iter().take(2).map(|review| {
            let rating = if review.rating.is_empty() {
                "Unrated"
            } else {
                review.rating.as_str()
            };
            format!("{} rated '{}' as {}.", review.publisher, review.title, rating)
        }),
        SUMMARY_CHARS,
    );
    let confidence = round2(0.6 + reviews.len().min(5) as f64 * 0.05);

    SignalRecord::ok(source, Assessment::Verdict(majority_verdict(reviews)), confidence)
        .with_evidence(evidence)
        .with_notes(notes)
}
