//! Offline tone scanner
//!
//! Deterministic regex families for manipulative language. Each family
//! contributes at most one excerpt; the number of distinct families decides
//! the risk level.

use async_trait::async_trait;
use claimcheck_core::{Assessment, Evidence, Risk, SignalRecord, SignalSource, SourceError};
use regex::Regex;

use crate::error::ProviderError;

const CONTEXT_CHARS: usize = 40;

const FAMILIES: [(&str, &str); 6] = [
    (
        "urgency",
        r"(?i)\b(urgent(ly)?|immediately|act now|right away|within \d+ (hours?|minutes?)|expires? (today|soon)|last chance|final notice|limited time)\b",
    ),
    (
        "fear or threat",
        r"(?i)\b(suspended|locked|arrest(ed)?|legal action|lawsuit|penalt(y|ies)|unauthori[sz]ed|compromised|terminated|deactivated)\b",
    ),
    (
        "authority impersonation",
        r"(?i)\b(irs|hmrc|fbi|police|bank security|security team|customer support|tax office|official notice|government agency)\b",
    ),
    (
        "reward framing",
        r"(?i)\b(you('ve| have)? won|winner|prize|lottery|free gift|reward|guaranteed (returns?|profits?)|double your)\b",
    ),
    (
        "payment request",
        r"(?i)\b(gift cards?|wire transfer|bitcoin|processing fee|pay (a|the) fee|western union|send money)\b",
    ),
    (
        "credential request",
        r"(?i)\b(password|passcode|one[- ]time code|otp|verification code|login details|social security number|account number|verify your (account|identity))\b",
    ),
];

#[derive(Debug, Clone, PartialEq)]
pub struct ToneHit {
    pub family: &'static str,
    pub excerpt: String,
}

pub struct ToneScanner {
    families: Vec<(&'static str, Regex)>,
}

impl ToneScanner {
    pub fn new() -> Result<Self, regex::Error> {
        let families = FAMILIES
            .iter()
            .map(|(family, pattern)| Regex::new(pattern).map(|regex| (*family, regex)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { families })
    }

    /// First hit of every family that matches, in family order.
    pub fn scan(&self, text: &str) -> Vec<ToneHit> {
        self.families
            .iter()
            .filter_map(|(family, regex)| {
                regex.find(text).map(|found| ToneHit {
                    family: *family,
                    excerpt: excerpt(text, found.start(), found.end()),
                })
            })
            .collect()
    }

    pub fn record(&self, source: &str, text: &str) -> SignalRecord {
        if text.trim().is_empty() {
            return SignalRecord::no_data(source, "No message text to scan.");
        }
        let hits = self.scan(text);
        let (level, confidence) = match hits.len() {
            0 => (Risk::Low, 0.35),
            1 => (Risk::Low, 0.45),
            2 => (Risk::Medium, 0.6),
            _ => (Risk::High, 0.75),
        };
        let notes = if hits.is_empty() {
            "No manipulative tone cues detected.".to_string()
        } else {
            let families: Vec<&str> = hits.iter().map(|hit| hit.family).collect();
            format!("Detected cues: {}.", families.join(", "))
        };
        let evidence = hits
            .into_iter()
            .map(|hit| Evidence::excerpt(hit.family, hit.excerpt))
            .collect();

        SignalRecord::ok(source, Assessment::Risk(level), confidence)
            .with_evidence(evidence)
            .with_notes(notes)
    }
}

/// Match plus up to [`CONTEXT_CHARS`] characters either side, whitespace collapsed.
fn excerpt(text: &str, start: usize, end: usize) -> String {
    let from = text[..start]
        .char_indices()
        .rev()
        .take(CONTEXT_CHARS)
        .last()
        .map(|(i, _)| i)
        .unwrap_or(start);
    let to = text[end..]
        .char_indices()
        .nth(CONTEXT_CHARS)
        .map(|(i, _)| end + i)
        .unwrap_or(text.len());

    let mut quoted = text[from..to].split_whitespace().collect::<Vec<_>>().join(" ");
    if from > 0 {
        quoted.insert_str(0, "...");
    }
    if to < text.len() {
        quoted.push_str("...");
    }
    quoted
}

pub struct ToneSource {
    name: String,
    scanner: ToneScanner,
}

impl ToneSource {
    pub fn new(name: impl Into<String>) -> Result<Self, ProviderError> {
        Ok(Self {
            name: name.into(),
            scanner: ToneScanner::new()?,
        })
    }
}

#[async_trait]
impl SignalSource for ToneSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn invoke(&self, claim: &str) -> Result<SignalRecord, SourceError> {
        Ok(self.scanner.record(&self.name, claim))
    }
}
