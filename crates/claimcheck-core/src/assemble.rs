//! Report Assembler
//!
//! Merges the lane verdicts of one submission into a [`VerificationReport`].
//! Pure: the same inputs always produce the same report, and nothing is added
//! that an upstream signal record did not supply.

use std::collections::BTreeMap;

use crate::aggregate::VerdictTally;
use crate::config::{EngineConfig, TiePolicy};
use crate::error::{EngineError, EngineResult};
use crate::model::{
    ConfidenceRange, Lane, LaneVerdict, NumberedSource, OverallOutcome, Risk, SkippedLane,
    Verdict, VerificationReport,
};
use crate::url_key::UrlDeduper;

#[derive(Debug, Clone)]
pub struct ReportAssembler {
    tie_policy: TiePolicy,
}

impl ReportAssembler {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            tie_policy: config.tie_policy,
        }
    }

    /// Assemble the report.
    ///
    /// Every executed lane must have a verdict; otherwise this refuses with
    /// [`EngineError::AssemblyPrecondition`] rather than emit a partial report.
    pub fn assemble(
        &self,
        verdicts: &BTreeMap<Lane, LaneVerdict>,
        executed: &[Lane],
        skipped: &[SkippedLane],
    ) -> EngineResult<VerificationReport> {
        let mut executed_lanes = executed.to_vec();
        executed_lanes.sort();
        executed_lanes.dedup();

        let missing: Vec<Lane> = executed_lanes
            .iter()
            .copied()
            .filter(|lane| !verdicts.contains_key(lane))
            .collect();
        if !missing.is_empty() {
            return Err(EngineError::AssemblyPrecondition { missing });
        }

        let lane_verdicts: BTreeMap<Lane, LaneVerdict> = executed_lanes
            .iter()
            .filter_map(|lane| verdicts.get(lane).map(|verdict| (*lane, verdict.clone())))
            .collect();

        let truth_outcome = self.truth_outcome(&lane_verdicts);
        let scam_risk = lane_verdicts
            .get(&Lane::Scam)
            .and_then(|verdict| verdict.consensus.risk());
        let overall_outcome = match scam_risk {
            Some(Risk::High) => OverallOutcome::ScamRisk,
            _ => OverallOutcome::from(truth_outcome),
        };

        let overall_confidence_range = lane_verdicts
            .values()
            .map(|verdict| verdict.confidence_range)
            .reduce(|acc, range| acc.union(&range))
            .unwrap_or(ConfidenceRange::ZERO);

        Ok(VerificationReport {
            global_sources: number_sources(&lane_verdicts),
            lane_verdicts,
            skipped_lanes: skipped_entries(skipped, &executed_lanes),
            executed_lanes,
            overall_outcome,
            truth_outcome,
            scam_risk,
            immediate_action_required: scam_risk == Some(Risk::High),
            overall_confidence_range,
            claim_overview: None,
        })
    }

    /// Report for a submission where nothing could be merged: every lane is
    /// listed as skipped and the outcome is `unknown`.
    pub fn empty(&self, skipped: &[SkippedLane]) -> VerificationReport {
        VerificationReport {
            lane_verdicts: BTreeMap::new(),
            executed_lanes: Vec::new(),
            skipped_lanes: skipped_entries(skipped, &[]),
            overall_outcome: OverallOutcome::Unknown,
            truth_outcome: Verdict::Unknown,
            scam_risk: None,
            immediate_action_required: false,
            overall_confidence_range: ConfidenceRange::ZERO,
            global_sources: Vec::new(),
            claim_overview: None,
        }
    }

    /// News/fact consensus across lanes; `unknown` when neither ran.
    fn truth_outcome(&self, verdicts: &BTreeMap<Lane, LaneVerdict>) -> Verdict {
        let tally = VerdictTally::from_verdicts(
            verdicts
                .values()
                .filter(|verdict| verdict.lane.is_verdict_lane())
                .filter_map(|verdict| verdict.consensus.verdict()),
        );
        tally.consensus(self.tie_policy)
    }
}

/// Concatenate lane sources in lane order (news, fact, scam), dedup, number 1..N.
fn number_sources(verdicts: &BTreeMap<Lane, LaneVerdict>) -> Vec<NumberedSource> {
    let mut deduper = UrlDeduper::new();
    let mut numbered = Vec::new();

    for lane in Lane::ALL {
        let Some(verdict) = verdicts.get(&lane) else {
            continue;
        };
        for source in &verdict.sources {
            if deduper.admit(&source.url) {
                numbered.push(NumberedSource {
                    index: numbered.len() + 1,
                    label: source.label.clone(),
                    url: source.url.clone(),
                    lane,
                });
            }
        }
    }

    numbered
}

/// Skip entries sorted by lane, one per lane, never for a lane that ran.
fn skipped_entries(skipped: &[SkippedLane], executed: &[Lane]) -> Vec<SkippedLane> {
    let mut entries: Vec<SkippedLane> = skipped
        .iter()
        .filter(|entry| !executed.contains(&entry.lane))
        .cloned()
        .collect();
    entries.sort_by_key(|entry| entry.lane);
    entries.dedup_by_key(|entry| entry.lane);
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Consensus, SkipReason, SourceRef};

    fn lane_verdict(lane: Lane, consensus: Consensus, range: ConfidenceRange) -> LaneVerdict {
        LaneVerdict {
            lane,
            consensus,
            confidence_range: range,
            sources: Vec::new(),
            excerpts: Vec::new(),
            gaps: Vec::new(),
            raw_errors: Vec::new(),
        }
    }

    fn truth(lane: Lane, verdict: Verdict, confidence: f64) -> LaneVerdict {
        lane_verdict(lane, Consensus::Verdict(verdict), ConfidenceRange::point(confidence))
    }

    fn scam(risk: Risk, range: ConfidenceRange) -> LaneVerdict {
        lane_verdict(Lane::Scam, Consensus::Risk(risk), range)
    }

    fn assembler() -> ReportAssembler {
        ReportAssembler::new(&EngineConfig::default())
    }

    #[test]
    fn refuses_partial_input() {
        let verdicts = BTreeMap::from([(Lane::News, truth(Lane::News, Verdict::True, 0.7))]);
        let err = assembler()
            .assemble(&verdicts, &[Lane::News, Lane::Fact], &[])
            .unwrap_err();
        assert_eq!(
            err,
            EngineError::AssemblyPrecondition {
                missing: vec![Lane::Fact]
            }
        );
    }

    #[test]
    fn high_scam_risk_takes_precedence_but_truth_is_kept() {
        let verdicts = BTreeMap::from([
            (Lane::Fact, truth(Lane::Fact, Verdict::True, 0.8)),
            (Lane::Scam, scam(Risk::High, ConfidenceRange { min: 0.4, max: 0.9 })),
        ]);
        let report = assembler()
            .assemble(&verdicts, &[Lane::Scam, Lane::Fact], &[])
            .unwrap();
        assert_eq!(report.overall_outcome, OverallOutcome::ScamRisk);
        assert_eq!(report.truth_outcome, Verdict::True);
        assert_eq!(report.scam_risk, Some(Risk::High));
        assert!(report.immediate_action_required);
        assert_eq!(report.executed_lanes, vec![Lane::Fact, Lane::Scam]);
        assert_eq!(
            report.overall_confidence_range,
            ConfidenceRange { min: 0.4, max: 0.9 }
        );
    }

    #[test]
    fn medium_scam_risk_is_reported_alongside() {
        let verdicts = BTreeMap::from([
            (Lane::News, truth(Lane::News, Verdict::False, 0.6)),
            (Lane::Scam, scam(Risk::Medium, ConfidenceRange::point(0.55))),
        ]);
        let report = assembler()
            .assemble(&verdicts, &[Lane::News, Lane::Scam], &[])
            .unwrap();
        assert_eq!(report.overall_outcome, OverallOutcome::False);
        assert_eq!(report.scam_risk, Some(Risk::Medium));
        assert!(!report.immediate_action_required);
    }

    #[test]
    fn scam_only_is_unknown() {
        let verdicts = BTreeMap::from([(Lane::Scam, scam(Risk::Low, ConfidenceRange::point(0.4)))]);
        let report = assembler().assemble(&verdicts, &[Lane::Scam], &[]).unwrap();
        assert_eq!(report.overall_outcome, OverallOutcome::Unknown);
    }

    #[test]
    fn news_and_fact_disagreeing_follow_tie_policy() {
        let verdicts = BTreeMap::from([
            (Lane::News, truth(Lane::News, Verdict::True, 0.7)),
            (Lane::Fact, truth(Lane::Fact, Verdict::False, 0.8)),
        ]);
        let lanes = [Lane::News, Lane::Fact];
        let mixed = assembler().assemble(&verdicts, &lanes, &[]).unwrap();
        assert_eq!(mixed.overall_outcome, OverallOutcome::Mixed);

        let config = EngineConfig::default().with_tie_policy(TiePolicy::Unknown);
        let strict = ReportAssembler::new(&config)
            .assemble(&verdicts, &lanes, &[])
            .unwrap();
        assert_eq!(strict.overall_outcome, OverallOutcome::Unknown);
    }

    #[test]
    fn verdicts_of_unexecuted_lanes_are_ignored() {
        let mut news = truth(Lane::News, Verdict::True, 0.7);
        news.sources = vec![SourceRef::new("Reuters", "https://reuters.com/x")];
        let verdicts = BTreeMap::from([(Lane::News, news)]);
        let report = assembler()
            .assemble(&verdicts, &[], &[SkippedLane::new(Lane::News, SkipReason::NotApplicable)])
            .unwrap();
        assert!(report.lane_verdicts.is_empty());
        assert!(report.global_sources.is_empty());
        assert_eq!(report.overall_outcome, OverallOutcome::Unknown);
        assert_eq!(report.overall_confidence_range, ConfidenceRange::ZERO);
    }

    #[test]
    fn skipped_entries_never_shadow_executed_lanes() {
        let verdicts = BTreeMap::from([(
            Lane::Fact,
            lane_verdict(Lane::Fact, Consensus::Verdict(Verdict::Unknown), ConfidenceRange::ZERO),
        )]);
        let skipped = [
            SkippedLane::new(Lane::Scam, SkipReason::NotApplicable),
            SkippedLane::new(Lane::Fact, SkipReason::MissingSummaryState),
            SkippedLane::new(Lane::News, SkipReason::NotApplicable),
        ];
        let report = assembler().assemble(&verdicts, &[Lane::Fact], &skipped).unwrap();
        let lanes: Vec<Lane> = report.skipped_lanes.iter().map(|s| s.lane).collect();
        assert_eq!(lanes, vec![Lane::News, Lane::Scam]);
    }

    #[test]
    fn empty_report_lists_skips() {
        let report = assembler().empty(&[
            SkippedLane::new(Lane::Scam, SkipReason::MissingSummaryState),
            SkippedLane::new(Lane::News, SkipReason::MissingSummaryState),
        ]);
        assert_eq!(report.overall_outcome, OverallOutcome::Unknown);
        assert_eq!(report.skipped_lanes[0].lane, Lane::News);
    }
}
