use serde::{Deserialize, Serialize};
use std::fmt;

use super::lane::Lane;
use super::signal::{Evidence, Risk, Verdict};

/// A deduplicated citation carried by a lane verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRef {
    pub label: String,
    pub url: String,
}

impl SourceRef {
    pub fn new(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            url: url.into(),
        }
    }
}

impl From<&Evidence> for SourceRef {
    fn from(evidence: &Evidence) -> Self {
        Self::new(evidence.label.clone(), evidence.url.clone())
    }
}

/// Closed interval of confidences; `min == max` for a single contributor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceRange {
    pub min: f64,
    pub max: f64,
}

impl ConfidenceRange {
    pub const ZERO: ConfidenceRange = ConfidenceRange { min: 0.0, max: 0.0 };

    pub fn point(value: f64) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    /// Span of the given values, or `None` when there are none.
    pub fn spanning<I: IntoIterator<Item = f64>>(values: I) -> Option<Self> {
        values.into_iter().fold(None, |range, value| {
            Some(match range {
                None => Self::point(value),
                Some(range) => range.including(value),
            })
        })
    }

    pub fn including(&self, value: f64) -> Self {
        Self {
            min: self.min.min(value),
            max: self.max.max(value),
        }
    }

    /// Component-wise min/max of two ranges.
    pub fn union(&self, other: &ConfidenceRange) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }

    pub fn is_point(&self) -> bool {
        self.min == self.max
    }
}

impl fmt::Display for ConfidenceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_point() {
            write!(f, "{:.2}", self.min)
        } else {
            write!(f, "{:.2}-{:.2}", self.min, self.max)
        }
    }
}

/// Consensus outcome of a lane, tagged by the lane's vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Consensus {
    /// News and fact lanes.
    Verdict(Verdict),
    /// Scam lane with at least one contributing `ok` record.
    Risk(Risk),
    /// Scam lane where nothing contributed.
    UnknownRisk,
}

impl Consensus {
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Verdict(Verdict::Unknown) | Self::UnknownRisk)
    }

    pub fn verdict(&self) -> Option<Verdict> {
        match self {
            Self::Verdict(verdict) => Some(*verdict),
            Self::Risk(_) | Self::UnknownRisk => None,
        }
    }

    pub fn risk(&self) -> Option<Risk> {
        match self {
            Self::Risk(risk) => Some(*risk),
            Self::Verdict(_) | Self::UnknownRisk => None,
        }
    }
}

impl fmt::Display for Consensus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Verdict(verdict) => f.write_str(verdict.as_str()),
            Self::Risk(risk) => f.write_str(risk.as_str()),
            Self::UnknownRisk => f.write_str("unknown"),
        }
    }
}

/// Aggregated result of one lane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaneVerdict {
    pub lane: Lane,
    pub consensus: Consensus,
    pub confidence_range: ConfidenceRange,
    /// Deduplicated by normalized URL, first-seen order, first-seen label.
    pub sources: Vec<SourceRef>,
    /// Non-linkable evidence (quoted excerpts) from contributing records.
    #[serde(default)]
    pub excerpts: Vec<Evidence>,
    pub gaps: Vec<String>,
    /// Verbatim notes of every `error` record.
    pub raw_errors: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spanning_empty_is_none() {
        assert_eq!(ConfidenceRange::spanning(Vec::new()), None);
    }

    #[test]
    fn spanning_values() {
        let range = ConfidenceRange::spanning([0.8, 0.7, 0.75]).unwrap();
        assert_eq!(range, ConfidenceRange { min: 0.7, max: 0.8 });
    }

    #[test]
    fn display_point_and_range() {
        assert_eq!(ConfidenceRange::point(0.4).to_string(), "0.40");
        assert_eq!(
            ConfidenceRange { min: 0.7, max: 0.8 }.to_string(),
            "0.70-0.80"
        );
    }

    #[test]
    fn consensus_display() {
        assert_eq!(Consensus::Verdict(Verdict::Mixed).to_string(), "mixed");
        assert_eq!(Consensus::Risk(Risk::Low).to_string(), "low");
        assert_eq!(Consensus::UnknownRisk.to_string(), "unknown");
        assert!(Consensus::UnknownRisk.is_unknown());
    }
}
