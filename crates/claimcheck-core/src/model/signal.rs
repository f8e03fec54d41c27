use serde::{Deserialize, Serialize};
use std::fmt;

// ─── Status ───────────────────────────────────────────────────

/// Outcome class of one signal source call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalStatus {
    Ok,
    NoData,
    NoMatch,
    Error,
}

impl SignalStatus {
    /// Parse a provider status string. Anything unrecognised is an error.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "ok" => Self::Ok,
            "no_data" | "no-data" | "nodata" => Self::NoData,
            "no_match" | "no-match" | "nomatch" => Self::NoMatch,
            _ => Self::Error,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::NoData => "no_data",
            Self::NoMatch => "no_match",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for SignalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Lane vocabularies ────────────────────────────────────────

/// Truth value vocabulary of the news and fact lanes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    True,
    False,
    Mixed,
    Unknown,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::True => "true",
            Self::False => "false",
            Self::Mixed => "mixed",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pattern-match vocabulary of scam reasoning sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScamVerdict {
    LikelyScam,
    Unclear,
    Benign,
}

impl ScamVerdict {
    pub fn risk(&self) -> Risk {
        match self {
            Self::LikelyScam => Risk::High,
            Self::Unclear => Risk::Medium,
            Self::Benign => Risk::Low,
        }
    }
}

/// Risk level reported by URL-reputation and tone sources. Ordered low < medium < high.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Risk {
    Low,
    Medium,
    High,
}

impl Risk {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" | "moderate" => Some(Self::Medium),
            "high" | "critical" => Some(Self::High),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Risk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a single source concluded, tagged by vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Assessment {
    Verdict(Verdict),
    Scam(ScamVerdict),
    Risk(Risk),
    Unrated,
}

impl Assessment {
    /// Risk implied by this assessment, if it speaks a risk vocabulary.
    pub fn risk(&self) -> Option<Risk> {
        match self {
            Self::Risk(risk) => Some(*risk),
            Self::Scam(verdict) => Some(verdict.risk()),
            Self::Verdict(_) | Self::Unrated => None,
        }
    }

    /// Truth value implied by this assessment; non-truth vocabularies abstain.
    pub fn verdict(&self) -> Verdict {
        match self {
            Self::Verdict(verdict) => *verdict,
            Self::Scam(_) | Self::Risk(_) | Self::Unrated => Verdict::Unknown,
        }
    }
}

// ─── Evidence ─────────────────────────────────────────────────

/// A citation or quoted excerpt backing a signal.
///
/// `url` is empty only for sources without linkable citations (tone
/// scanning), which carry the excerpt in `snippet` and the detected pattern
/// in `label`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evidence {
    pub label: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
}

impl Evidence {
    pub fn new(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            url: url.into(),
            snippet: None,
        }
    }

    /// Evidence without a link: a quoted excerpt plus the pattern it matched.
    pub fn excerpt(pattern: impl Into<String>, excerpt: impl Into<String>) -> Self {
        Self {
            label: pattern.into(),
            url: String::new(),
            snippet: Some(excerpt.into()),
        }
    }

    pub fn with_snippet(mut self, snippet: impl Into<String>) -> Self {
        let snippet = snippet.into();
        self.snippet = if snippet.trim().is_empty() {
            None
        } else {
            Some(snippet)
        };
        self
    }

    pub fn is_linkable(&self) -> bool {
        !self.url.trim().is_empty()
    }
}

// ─── Signal record ────────────────────────────────────────────

/// Clamp a confidence into [0.0, 1.0]; NaN becomes 0.0.
pub fn clamp_confidence(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Output of one signal source for one claim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalRecord {
    /// Name of the configured source that produced this record.
    pub source: String,
    pub status: SignalStatus,
    pub assessment: Assessment,
    pub confidence: f64,
    #[serde(default)]
    pub evidence: Vec<Evidence>,
    #[serde(default)]
    pub notes: String,
}

impl SignalRecord {
    pub fn new(
        source: impl Into<String>,
        status: SignalStatus,
        assessment: Assessment,
        confidence: f64,
    ) -> Self {
        Self {
            source: source.into(),
            status,
            assessment,
            confidence: clamp_confidence(confidence),
            evidence: Vec::new(),
            notes: String::new(),
        }
    }

    pub fn ok(source: impl Into<String>, assessment: Assessment, confidence: f64) -> Self {
        Self::new(source, SignalStatus::Ok, assessment, confidence)
    }

    pub fn no_data(source: impl Into<String>, notes: impl Into<String>) -> Self {
        Self::new(source, SignalStatus::NoData, Assessment::Unrated, 0.0).with_notes(notes)
    }

    /// A failed call. Confidence is pinned to 0.0 and notes are never empty.
    pub fn error(source: impl Into<String>, notes: impl Into<String>) -> Self {
        let mut record =
            Self::new(source, SignalStatus::Error, Assessment::Unrated, 0.0).with_notes(notes);
        record.fill_error_notes();
        record
    }

    pub fn with_status(mut self, status: SignalStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_evidence(mut self, evidence: Vec<Evidence>) -> Self {
        self.evidence = evidence;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    pub fn is_error(&self) -> bool {
        self.status == SignalStatus::Error
    }

    pub fn is_ok(&self) -> bool {
        self.status == SignalStatus::Ok
    }

    /// Enforce record invariants on output from an untrusted source.
    ///
    /// Clamps confidence, pins error confidence to 0.0, guarantees non-empty
    /// error notes and applies the soft notes bound.
    pub fn normalized(mut self, max_notes_chars: usize) -> Self {
        self.confidence = clamp_confidence(self.confidence);
        if self.is_error() {
            self.confidence = 0.0;
            self.fill_error_notes();
        }
        if max_notes_chars > 3 && self.notes.chars().count() > max_notes_chars {
            let kept: String = self.notes.chars().take(max_notes_chars - 3).collect();
            self.notes = format!("{}...", kept.trim_end());
        }
        self
    }

    fn fill_error_notes(&mut self) {
        if self.notes.trim().is_empty() {
            self.notes = format!("{} failed without reporting a reason", self.source);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_status_strings_are_errors() {
        assert_eq!(SignalStatus::parse("OK"), SignalStatus::Ok);
        assert_eq!(SignalStatus::parse("no_data"), SignalStatus::NoData);
        assert_eq!(SignalStatus::parse("pending"), SignalStatus::Error);
    }

    #[test]
    fn risk_ordering() {
        assert!(Risk::Low < Risk::Medium);
        assert!(Risk::Medium < Risk::High);
        assert_eq!(ScamVerdict::LikelyScam.risk(), Risk::High);
    }

    #[test]
    fn confidence_is_clamped() {
        assert_eq!(clamp_confidence(1.7), 1.0);
        assert_eq!(clamp_confidence(-0.2), 0.0);
        assert_eq!(clamp_confidence(f64::NAN), 0.0);
        let record = SignalRecord::ok("a", Assessment::Unrated, 3.0);
        assert_eq!(record.confidence, 1.0);
    }

    #[test]
    fn error_record_always_has_notes() {
        let record = SignalRecord::error("fact_registry", "  ");
        assert_eq!(record.confidence, 0.0);
        assert_eq!(record.notes, "fact_registry failed without reporting a reason");
    }

    #[test]
    fn normalized_pins_error_confidence_and_bounds_notes() {
        let mut record = SignalRecord::ok("gnews", Assessment::Unrated, 0.9)
            .with_status(SignalStatus::Error)
            .with_notes("x".repeat(50));
        record.confidence = 0.9;
        let record = record.normalized(20);
        assert_eq!(record.confidence, 0.0);
        assert_eq!(record.notes.chars().count(), 20);
        assert!(record.notes.ends_with("..."));
    }

    #[test]
    fn assessment_serializes_tagged() {
        let json = serde_json::to_value(Assessment::Risk(Risk::High)).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "risk", "value": "high"}));
        let json = serde_json::to_value(Assessment::Unrated).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "unrated"}));
    }
}
