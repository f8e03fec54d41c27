//! Lane selection
//!
//! Which lanes apply to a submission is a classification decision made
//! outside the engine. [`LaneSelector`] is the seam; two simple selectors
//! ship with the crate.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::model::Lane;

/// Lanes chosen for one submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaneSelection {
    lanes: BTreeSet<Lane>,
}

impl LaneSelection {
    pub fn new<I: IntoIterator<Item = Lane>>(lanes: I) -> Self {
        Self {
            lanes: lanes.into_iter().collect(),
        }
    }

    pub fn contains(&self, lane: Lane) -> bool {
        self.lanes.contains(&lane)
    }

    /// Selected lanes in merge order.
    pub fn lanes(&self) -> impl Iterator<Item = Lane> + '_ {
        self.lanes.iter().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }
}

pub trait LaneSelector: Send + Sync {
    fn select(&self, claim: &str) -> LaneSelection;
}

/// Always selects the same lanes.
#[derive(Debug, Clone)]
pub struct FixedSelector {
    selection: LaneSelection,
}

impl FixedSelector {
    pub fn new<I: IntoIterator<Item = Lane>>(lanes: I) -> Self {
        Self {
            selection: LaneSelection::new(lanes),
        }
    }

    pub fn all() -> Self {
        Self::new(Lane::ALL)
    }
}

impl LaneSelector for FixedSelector {
    fn select(&self, _claim: &str) -> LaneSelection {
        self.selection.clone()
    }
}

const SCAM_CUES: &[&str] = &[
    "http://",
    "https://",
    "www.",
    "click",
    "link",
    "password",
    "login",
    "verify your",
    "account",
    "bank",
    "wire",
    "gift card",
    "bitcoin",
    "crypto",
    "payment",
    "prize",
    "winner",
    "refund",
    "urgent",
    "$",
    "€",
    "£",
];

const NEWS_CUES: &[&str] = &[
    "breaking",
    "report",
    "announced",
    "according to",
    "yesterday",
    "today",
    "this week",
    "news",
    "election",
    "president",
    "minister",
    "government",
    "police",
];

/// Keyword cues: links, money or credential wording select scam; reporting
/// wording selects news; fact is always selected.
#[derive(Debug, Clone, Default)]
pub struct HeuristicSelector;

impl HeuristicSelector {
    pub fn new() -> Self {
        Self
    }
}

impl LaneSelector for HeuristicSelector {
    fn select(&self, claim: &str) -> LaneSelection {
        let text = claim.to_lowercase();
        let hits = |cues: &[&str]| cues.iter().any(|cue| text.contains(cue));

        let mut lanes = vec![Lane::Fact];
        if hits(NEWS_CUES) {
            lanes.push(Lane::News);
        }
        if hits(SCAM_CUES) {
            lanes.push(Lane::Scam);
        }
        LaneSelection::new(lanes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_selector_ignores_claim() {
        let selector = FixedSelector::new([Lane::Scam, Lane::News]);
        let lanes: Vec<Lane> = selector.select("anything").lanes().collect();
        assert_eq!(lanes, vec![Lane::News, Lane::Scam]);
        assert_eq!(FixedSelector::all().select("x").lanes().count(), 3);
    }

    #[test]
    fn heuristic_picks_scam_for_links_and_money() {
        let selection = HeuristicSelector::new()
            .select("URGENT: verify your account at http://secure-bank.example to claim $500");
        assert!(selection.contains(Lane::Scam));
        assert!(selection.contains(Lane::Fact));
    }

    #[test]
    fn heuristic_picks_news_for_reporting() {
        let selection =
            HeuristicSelector::new().select("The government announced a new tax yesterday");
        assert!(selection.contains(Lane::News));
        assert!(!selection.contains(Lane::Scam));
    }

    #[test]
    fn plain_claim_is_fact_only() {
        let selection = HeuristicSelector::new().select("Water boils at 100 degrees Celsius");
        assert_eq!(selection.lanes().collect::<Vec<_>>(), vec![Lane::Fact]);
    }
}
