//! Provider payload decoding
//!
//! Turns the loosely-typed JSON object a provider (or a web-reasoning model)
//! returns into a [`SignalRecord`]. Evidence arrives under provider-specific
//! keys; every one of them is folded into the same evidence list.

use serde_json::Value;

use crate::aggregate::{map_rating, map_scam_label};
use crate::model::{clamp_confidence, Assessment, Evidence, Lane, SignalRecord, SignalStatus};

/// Evidence keys in the order their entries are appended.
const EVIDENCE_KEYS: &[&str] = &[
    "fact_checks",
    "supporting_sources",
    "articles",
    "flagged_urls",
    "citations",
    "supporting_citations",
    "references",
    "pattern_matches",
    "triggers",
];

/// Decode a provider JSON object for the given lane.
///
/// Missing or unrecognised `status` decodes to `error`; out-of-range
/// confidences are clamped and a missing confidence reads as 0.0.
pub fn decode_record(source: &str, lane: Lane, payload: &Value) -> SignalRecord {
    let status = payload
        .get("status")
        .and_then(Value::as_str)
        .map(SignalStatus::parse)
        .unwrap_or(SignalStatus::Error);

    let confidence = payload.get("confidence").and_then(confidence_value).unwrap_or(0.0);

    let mut record = SignalRecord::new(source, status, assessment(lane, payload), confidence)
        .with_evidence(evidence(payload))
        .with_notes(notes(payload));
    if record.is_error() {
        record.confidence = 0.0;
        if record.notes.trim().is_empty() {
            record.notes = format!("{} reported an error without details", source);
        }
    }
    record
}

impl SignalRecord {
    /// Decode a provider payload; see [`decode_record`].
    pub fn from_payload(source: &str, lane: Lane, payload: &Value) -> Self {
        decode_record(source, lane, payload)
    }
}

/// Numeric or numeric-string confidence, clamped. `None` when absent or unparseable.
pub fn confidence_value(value: &Value) -> Option<f64> {
    let raw = match value {
        Value::Number(number) => number.as_f64()?,
        Value::String(text) => text.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if raw.is_nan() {
        return None;
    }
    Some(clamp_confidence(raw))
}

fn assessment(lane: Lane, payload: &Value) -> Assessment {
    if let Some(risk) = payload.get("risk_level").and_then(Value::as_str) {
        return map_scam_label(risk);
    }
    match payload.get("verdict").and_then(Value::as_str) {
        Some(label) if lane.is_verdict_lane() => Assessment::Verdict(map_rating(label)),
        Some(label) => map_scam_label(label),
        None => Assessment::Unrated,
    }
}

fn notes(payload: &Value) -> String {
    ["notes", "synopsis", "recommended_action"]
        .iter()
        .filter_map(|key| payload.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .find(|text| !text.is_empty())
        .unwrap_or_default()
        .to_string()
}

fn evidence(payload: &Value) -> Vec<Evidence> {
    let mut items = Vec::new();
    for key in EVIDENCE_KEYS {
        let Some(entries) = payload.get(*key).and_then(Value::as_array) else {
            continue;
        };
        items.extend(entries.iter().filter_map(|entry| evidence_entry(key, entry)));
    }
    items
}

fn evidence_entry(key: &str, entry: &Value) -> Option<Evidence> {
    if let Some(text) = entry.as_str() {
        return labelled_link(text);
    }
    let field = |name: &str| {
        entry
            .get(name)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|value| !value.is_empty())
    };
    let url = field("url").unwrap_or_default();

    let evidence = match key {
        "fact_checks" => {
            let label = field("organization").or(field("publisher")).unwrap_or("Unknown");
            let snippet = match (field("rating"), field("snippet")) {
                (Some(rating), Some(snippet)) => format!("Rated {}: {}", rating, snippet),
                (Some(rating), None) => format!("Rated {}", rating),
                (None, Some(snippet)) => snippet.to_string(),
                (None, None) => String::new(),
            };
            Evidence::new(label, url).with_snippet(snippet)
        }
        "articles" => Evidence::new(field("source").or(field("title")).unwrap_or("Unknown"), url)
            .with_snippet(field("summary").or(field("title")).unwrap_or_default()),
        "flagged_urls" => Evidence::new(field("label").unwrap_or("Flagged URL"), url)
            .with_snippet(field("issue").unwrap_or_default()),
        "pattern_matches" => Evidence::excerpt(
            field("pattern").unwrap_or("pattern"),
            field("explanation").unwrap_or_default(),
        ),
        "triggers" => Evidence::excerpt(
            field("pattern").unwrap_or("trigger"),
            field("excerpt").unwrap_or_default(),
        ),
        _ => Evidence::new(field("title").or(field("label")).unwrap_or(url), url)
            .with_snippet(field("snippet").unwrap_or_default()),
    };

    if evidence.is_linkable() || evidence.snippet.is_some() {
        Some(evidence)
    } else {
        None
    }
}

/// Parse `"Label - URL"`, `"Label — URL"` or a bare URL.
fn labelled_link(text: &str) -> Option<Evidence> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    for separator in [" — ", " – ", " - "] {
        if let Some((label, url)) = text.rsplit_once(separator) {
            let url = url.trim();
            if looks_like_url(url) {
                return Some(Evidence::new(label.trim(), url));
            }
        }
    }
    if looks_like_url(text) {
        return Some(Evidence::new(text, text));
    }
    None
}

fn looks_like_url(text: &str) -> bool {
    let lower = text.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://") || lower.starts_with("www.")
}
