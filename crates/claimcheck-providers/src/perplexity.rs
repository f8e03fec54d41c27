//! Perplexity web reasoning
//!
//! One JSON-only chat completion per lane. The model answers in the lane's
//! payload shape; the answer is normalized (citation and confidence
//! fallbacks) and decoded like any other provider payload.

use async_trait::async_trait;
use claimcheck_core::payload::confidence_value;
use claimcheck_core::{Lane, SignalRecord, SignalSource, SourceError};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::sync::Arc;

use crate::http::{ensure_success, network_error};
use crate::settings::{ProviderSettings, PERPLEXITY_KEY_VAR};
use crate::text::round2;

const API_URL: &str = "https://api.perplexity.ai/chat/completions";

const BASE_DIRECTIVE: &str = "You are a careful research assistant. Reply with one JSON object \
that follows the schema below and nothing else: no code fences, no prose around it.";

/// Lane-specific prompt and payload conventions.
#[derive(Debug)]
pub struct ReasoningBrief {
    lane: Lane,
    system: &'static str,
    schema: &'static str,
    user_prefix: &'static str,
    max_tokens: u32,
    /// Payload key holding the citations; filled from search results when empty.
    citation_key: &'static str,
    default_verdict: &'static str,
    default_confidence: f64,
}

pub const NEWS_BRIEF: ReasoningBrief = ReasoningBrief {
    lane: Lane::News,
    system: "Judge whether a reported news event is supported by current coverage. Weigh \
reputable outlets above aggregators, note where reports conflict, and lower confidence when \
they do.",
    schema: r#"{"status": "ok" | "no_data" | "error", "verdict": "true" | "false" | "mixed" | "unknown", "confidence": number, "reasoning_bullets": string[], "citations": string[] (each "Outlet - URL"), "notes": string}"#,
    user_prefix: "Decide whether current reporting supports this news claim. Check the who, \
what, when and where.\n\nClaim: ",
    max_tokens: 900,
    citation_key: "citations",
    default_verdict: "unknown",
    default_confidence: 0.5,
};

pub const FACT_BRIEF: ReasoningBrief = ReasoningBrief {
    lane: Lane::Fact,
    system: "Check the factual accuracy of a statement against primary and authoritative \
sources. If the evidence conflicts, answer mixed and state both sides briefly. Give every \
reference with its full URL.",
    schema: r#"{"status": "ok" | "no_data" | "error", "verdict": "true" | "false" | "mixed" | "unknown", "confidence": number, "reasoning": string[], "references": [{"title": string, "url": string, "published": string}], "notes": string}"#,
    user_prefix: "Assess this factual statement. List the corroborating and the conflicting \
evidence, preferring primary sources.\n\nClaim: ",
    max_tokens: 900,
    citation_key: "references",
    default_verdict: "unknown",
    default_confidence: 0.5,
};

pub const SCAM_BRIEF: ReasoningBrief = ReasoningBrief {
    lane: Lane::Scam,
    system: "Compare a message with known scam archetypes such as phishing, advance-fee \
fraud, fake account suspensions and investment fraud. Look for red flags like pressure to act \
fast, payment requests and suspicious links.",
    schema: r#"{"status": "ok" | "no_match" | "error", "verdict": "likely_scam" | "unclear" | "benign", "confidence": number, "pattern_matches": [{"pattern": string, "explanation": string}], "supporting_citations": string[] (each "Source - URL"), "notes": string}"#,
    user_prefix: "Check this message for scam indicators. Name each matching pattern briefly \
and cite reputable descriptions of similar scams.\n\nMessage: ",
    max_tokens: 750,
    citation_key: "supporting_citations",
    default_verdict: "unclear",
    default_confidence: 0.4,
};

impl ReasoningBrief {
    pub fn for_lane(lane: Lane) -> &'static ReasoningBrief {
        match lane {
            Lane::News => &NEWS_BRIEF,
            Lane::Fact => &FACT_BRIEF,
            Lane::Scam => &SCAM_BRIEF,
        }
    }

    fn system_prompt(&self) -> String {
        format!("{}\n{}\nSchema:\n{}", BASE_DIRECTIVE, self.system, self.schema)
    }
}

/// A search result returned next to the completion.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub snippet: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Completion {
    pub payload: Value,
    pub search_results: Vec<SearchResult>,
}

/// Perplexity chat-completions client
pub struct PerplexityClient {
    http: Client,
    api_key: Option<String>,
    model: String,
}

impl PerplexityClient {
    pub fn new(http: Client, settings: &ProviderSettings) -> Self {
        Self {
            http,
            api_key: settings.perplexity_key.clone(),
            model: settings.perplexity_model.clone(),
        }
    }

    pub async fn complete_json(
        &self,
        brief: &ReasoningBrief,
        claim: &str,
    ) -> Result<Completion, SourceError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| SourceError::missing_credential(PERPLEXITY_KEY_VAR))?;

        let body = json!({
            "model": &self.model,
            "messages": [
                {"role": "system", "content": brief.system_prompt()},
                {"role": "user", "content": format!("{}{}", brief.user_prefix, claim)}
            ],
            "temperature": 0.1,
            "top_p": 0.8,
            "max_tokens": brief.max_tokens,
            "search_mode": "web",
            "return_related_questions": false,
            "return_images": false
        });

        let response = self
            .http
            .post(API_URL)
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(network_error)?;
        let response = ensure_success(response).await?;

        #[derive(Deserialize)]
        struct Message {
            #[serde(default)]
            content: String,
        }
        #[derive(Deserialize)]
        struct Choice {
            message: Message,
        }
        #[derive(Deserialize)]
        struct ApiResponse {
            #[serde(default)]
            choices: Vec<Choice>,
            #[serde(default)]
            search_results: Vec<SearchResult>,
        }

        let api_response: ApiResponse = response
            .json()
            .await
            .map_err(|e| SourceError::Parse(e.to_string()))?;
        let content = api_response
            .choices
            .first()
            .map(|choice| choice.message.content.as_str())
            .ok_or_else(|| SourceError::Parse("Perplexity returned no choices".to_string()))?;

        Ok(Completion {
            payload: parse_json_object(content)?,
            search_results: api_response
                .search_results
                .into_iter()
                .filter(|result| !result.url.trim().is_empty())
                .collect(),
        })
    }
}

/// The outermost `{...}` span of a model message, parsed as a JSON object.
pub fn parse_json_object(content: &str) -> Result<Value, SourceError> {
    let (Some(start), Some(end)) = (content.find('{'), content.rfind('}')) else {
        return Err(SourceError::Parse(
            "Perplexity response did not contain a JSON object".to_string(),
        ));
    };
    if end < start {
        return Err(SourceError::Parse(
            "Perplexity response did not contain a JSON object".to_string(),
        ));
    }
    let value: Value = serde_json::from_str(&content[start..=end])
        .map_err(|e| SourceError::Parse(format!("Perplexity JSON: {}", e)))?;
    if value.is_object() {
        Ok(value)
    } else {
        Err(SourceError::Parse("Perplexity JSON was not an object".to_string()))
    }
}

/// Fill defaults, citation fallback and confidence fallback into the model payload.
pub fn normalize_payload(brief: &ReasoningBrief, completion: Completion) -> Value {
    let mut payload = match completion.payload {
        Value::Object(map) => map,
        _ => Map::new(),
    };

    payload
        .entry("status")
        .or_insert_with(|| Value::from("ok"));
    payload
        .entry("verdict")
        .or_insert_with(|| Value::from(brief.default_verdict));

    let has_citations = payload
        .get(brief.citation_key)
        .and_then(Value::as_array)
        .is_some_and(|items| !items.is_empty());
    if !has_citations {
        payload.insert(
            brief.citation_key.to_string(),
            citations_from_results(brief, &completion.search_results),
        );
    }

    let cited = payload
        .get(brief.citation_key)
        .and_then(Value::as_array)
        .map(Vec::len)
        .unwrap_or(0);
    let fallback = fallback_confidence(cited, brief.default_confidence);
    let confidence = payload
        .get("confidence")
        .and_then(confidence_value)
        .map(round2)
        .unwrap_or(fallback);
    payload.insert("confidence".to_string(), Value::from(confidence));

    Value::Object(payload)
}

fn citations_from_results(brief: &ReasoningBrief, results: &[SearchResult]) -> Value {
    let entries = results.iter().enumerate().map(|(i, result)| {
        let title = result.title.trim();
        if brief.lane == Lane::Fact {
            let title = if title.is_empty() {
                format!("Source {}", i + 1)
            } else {
                title.to_string()
            };
            json!({
                "title": title,
                "url": result.url.trim(),
                "snippet": result.snippet.clone().unwrap_or_default(),
            })
        } else {
            let label = if title.is_empty() { result.url.trim() } else { title };
            Value::from(format!("{} - {}", label, result.url.trim()))
        }
    });
    Value::Array(entries.collect())
}

/// `default + 0.1` per citation, capped at 0.9.
pub fn fallback_confidence(citations: usize, default: f64) -> f64 {
    if citations == 0 {
        return default;
    }
    round2((default + citations as f64 * 0.1).min(0.9))
}

/// Web-reasoning signal source bound to one lane's brief.
pub struct ReasoningSource {
    name: String,
    brief: &'static ReasoningBrief,
    client: Arc<PerplexityClient>,
}

impl ReasoningSource {
    pub fn new(name: impl Into<String>, lane: Lane, client: Arc<PerplexityClient>) -> Self {
        Self {
            name: name.into(),
            brief: ReasoningBrief::for_lane(lane),
            client,
        }
    }
}

#[async_trait]
impl SignalSource for ReasoningSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn invoke(&self, claim: &str) -> Result<SignalRecord, SourceError> {
        let completion = self.client.complete_json(self.brief, claim).await?;
        let payload = normalize_payload(self.brief, completion);
        tracing::debug!(source = %self.name, lane = %self.brief.lane, "Web reasoning complete");
        Ok(SignalRecord::from_payload(&self.name, self.brief.lane, &payload))
    }
}
