use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

use super::lane::Lane;
use super::signal::{Risk, Verdict};
use super::verdict::{ConfidenceRange, LaneVerdict};

/// Why a lane has no verdict in the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    /// The lane selector did not pick the lane.
    #[serde(rename = "not applicable")]
    NotApplicable,
    /// The lane was selected but produced no verdict.
    #[serde(rename = "missing summary state")]
    MissingSummaryState,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotApplicable => "not applicable",
            Self::MissingSummaryState => "missing summary state",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedLane {
    pub lane: Lane,
    pub reason: SkipReason,
}

impl SkippedLane {
    pub fn new(lane: Lane, reason: SkipReason) -> Self {
        Self { lane, reason }
    }
}

/// Headline outcome of the whole report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverallOutcome {
    True,
    False,
    Mixed,
    Unknown,
    /// The scam lane reported high risk; the truth value is still carried
    /// in [`VerificationReport::truth_outcome`].
    ScamRisk,
}

impl OverallOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::True => "true",
            Self::False => "false",
            Self::Mixed => "mixed",
            Self::Unknown => "unknown",
            Self::ScamRisk => "scam_risk",
        }
    }
}

impl From<Verdict> for OverallOutcome {
    fn from(verdict: Verdict) -> Self {
        match verdict {
            Verdict::True => Self::True,
            Verdict::False => Self::False,
            Verdict::Mixed => Self::Mixed,
            Verdict::Unknown => Self::Unknown,
        }
    }
}

impl fmt::Display for OverallOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entry of the global numbered "Sources" list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberedSource {
    /// 1-based position in the global list.
    pub index: usize,
    pub label: String,
    /// Verbatim URL as supplied by the originating signal record.
    pub url: String,
    /// Lane that first cited the URL.
    pub lane: Lane,
}

/// Identity and receive time of the submission a report belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimOverview {
    pub submission_id: Uuid,
    pub submission_time: DateTime<Utc>,
}

/// Terminal artifact of one submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationReport {
    /// Only lanes that ran.
    pub lane_verdicts: BTreeMap<Lane, LaneVerdict>,
    pub executed_lanes: Vec<Lane>,
    pub skipped_lanes: Vec<SkippedLane>,
    pub overall_outcome: OverallOutcome,
    /// News/fact consensus, reported even when scam risk takes precedence.
    pub truth_outcome: Verdict,
    /// Scam lane risk when the scam lane ran and reached a level.
    pub scam_risk: Option<Risk>,
    /// Set when the scam lane reached high risk.
    pub immediate_action_required: bool,
    pub overall_confidence_range: ConfidenceRange,
    pub global_sources: Vec<NumberedSource>,
    /// Stamped by the orchestrator; absent on a bare assembly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claim_overview: Option<ClaimOverview>,
}

impl VerificationReport {
    pub fn with_claim_overview(mut self, overview: ClaimOverview) -> Self {
        self.claim_overview = Some(overview);
        self
    }

    pub fn verdict(&self, lane: Lane) -> Option<&LaneVerdict> {
        self.lane_verdicts.get(&lane)
    }

    pub fn was_executed(&self, lane: Lane) -> bool {
        self.executed_lanes.contains(&lane)
    }

    pub fn skip_reason(&self, lane: Lane) -> Option<SkipReason> {
        self.skipped_lanes
            .iter()
            .find(|skipped| skipped.lane == lane)
            .map(|skipped| skipped.reason)
    }

    /// Global index of a URL, matched by dedup key.
    pub fn source_index(&self, url: &str) -> Option<usize> {
        let key = crate::url_key::normalize_url(url);
        self.global_sources
            .iter()
            .find(|source| crate::url_key::normalize_url(&source.url) == key)
            .map(|source| source.index)
    }
}
