//! Truth-value consensus for the news and fact lanes.

use crate::config::TiePolicy;
use crate::model::{Consensus, Lane, LaneVerdict, SignalRecord, Verdict};

use super::{collect_evidence, confidence_range, status_gaps, LaneAggregator};

// Checked in this order: mixed before false before true ("half true",
// "not true", "mostly false" must not read as true).
const MIXED_KEYWORDS: &[&str] = &[
    "mixed",
    "mixture",
    "half true",
    "half-true",
    "partly",
    "partially",
];
const FALSE_KEYWORDS: &[&str] = &[
    "false",
    "untrue",
    "not true",
    "pants on fire",
    "fiction",
    "fake",
    "incorrect",
    "inaccurate",
    "scam",
];
const TRUE_KEYWORDS: &[&str] = &["true", "accurate", "legit", "correct", "verified"];

/// Map a raw rating or verdict label onto the truth vocabulary.
pub fn map_rating(label: &str) -> Verdict {
    let label = label.trim().to_lowercase();
    match label.as_str() {
        "" | "unknown" | "inconclusive" | "unrated" | "unverified" => return Verdict::Unknown,
        "true" => return Verdict::True,
        "false" => return Verdict::False,
        "mixed" => return Verdict::Mixed,
        _ => {}
    }
    let has = |keywords: &[&str]| keywords.iter().any(|k| label.contains(k));
    if has(MIXED_KEYWORDS) {
        Verdict::Mixed
    } else if has(FALSE_KEYWORDS) {
        Verdict::False
    } else if has(TRUE_KEYWORDS) {
        Verdict::True
    } else {
        Verdict::Unknown
    }
}

/// Vote counts per decisive class. `unknown` abstains.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VerdictTally {
    pub true_votes: usize,
    pub false_votes: usize,
    pub mixed_votes: usize,
}

impl VerdictTally {
    pub fn from_verdicts<I: IntoIterator<Item = Verdict>>(verdicts: I) -> Self {
        let mut tally = Self::default();
        for verdict in verdicts {
            tally.add(verdict);
        }
        tally
    }

    pub fn add(&mut self, verdict: Verdict) {
        match verdict {
            Verdict::True => self.true_votes += 1,
            Verdict::False => self.false_votes += 1,
            Verdict::Mixed => self.mixed_votes += 1,
            Verdict::Unknown => {}
        }
    }

    fn classes(&self) -> [(Verdict, usize); 3] {
        [
            (Verdict::True, self.true_votes),
            (Verdict::False, self.false_votes),
            (Verdict::Mixed, self.mixed_votes),
        ]
    }

    /// Strictly highest class wins; no votes is `unknown`; a tie between
    /// voted classes follows the policy.
    pub fn consensus(&self, policy: TiePolicy) -> Verdict {
        let classes = self.classes();
        let top = classes.iter().map(|(_, count)| *count).max().unwrap_or(0);
        if top == 0 {
            return Verdict::Unknown;
        }
        let mut leaders = classes.iter().filter(|(_, count)| *count == top);
        match (leaders.next(), leaders.next()) {
            (Some((verdict, _)), None) => *verdict,
            _ => match policy {
                TiePolicy::Mixed => Verdict::Mixed,
                TiePolicy::Unknown => Verdict::Unknown,
            },
        }
    }

    /// Describes the split when more than one class received votes.
    pub fn disagreement(&self) -> Option<String> {
        let voted: Vec<String> = self
            .classes()
            .iter()
            .filter(|(_, count)| *count > 0)
            .map(|(verdict, count)| format!("{} ({})", verdict, count))
            .collect();
        if voted.len() > 1 {
            Some(format!("sources disagree: {}", voted.join(" vs ")))
        } else {
            None
        }
    }
}

/// Aggregator for lanes speaking true/false/mixed/unknown.
#[derive(Debug, Clone)]
pub struct TruthLaneAggregator {
    lane: Lane,
    tie_policy: TiePolicy,
}

impl TruthLaneAggregator {
    pub fn news(tie_policy: TiePolicy) -> Self {
        Self {
            lane: Lane::News,
            tie_policy,
        }
    }

    pub fn fact(tie_policy: TiePolicy) -> Self {
        Self {
            lane: Lane::Fact,
            tie_policy,
        }
    }
}

impl LaneAggregator for TruthLaneAggregator {
    fn lane(&self) -> Lane {
        self.lane
    }

    fn aggregate(&self, records: &[SignalRecord]) -> LaneVerdict {
        let tally = VerdictTally::from_verdicts(
            records
                .iter()
                .filter(|record| !record.is_error())
                .map(|record| record.assessment.verdict()),
        );
        let (sources, excerpts) = collect_evidence(records);
        let (mut gaps, raw_errors) = status_gaps(records);
        if let Some(split) = tally.disagreement() {
            gaps.push(split);
        }

        LaneVerdict {
            lane: self.lane,
            consensus: Consensus::Verdict(tally.consensus(self.tie_policy)),
            confidence_range: confidence_range(records),
            sources,
            excerpts,
            gaps,
            raw_errors,
        }
    }
}
