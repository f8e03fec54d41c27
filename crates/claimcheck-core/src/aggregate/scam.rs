//! Risk consensus for the scam lane: the highest risk any `ok` record reports.

use crate::model::{Assessment, Consensus, Lane, LaneVerdict, Risk, ScamVerdict, SignalRecord};

use super::{collect_evidence, confidence_range, status_gaps, LaneAggregator};

/// Map a scam-lane label (pattern verdict or risk level) to an assessment.
pub fn map_scam_label(label: &str) -> Assessment {
    let label = label.trim().to_lowercase().replace([' ', '-'], "_");
    match label.as_str() {
        "likely_scam" | "scam" | "fraud" | "phishing" => Assessment::Scam(ScamVerdict::LikelyScam),
        "unclear" | "suspicious" | "uncertain" => Assessment::Scam(ScamVerdict::Unclear),
        "benign" | "legitimate" | "safe" => Assessment::Scam(ScamVerdict::Benign),
        other => Risk::parse(other)
            .map(Assessment::Risk)
            .unwrap_or(Assessment::Unrated),
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScamLaneAggregator;

impl ScamLaneAggregator {
    pub fn new() -> Self {
        Self
    }
}

impl LaneAggregator for ScamLaneAggregator {
    fn lane(&self) -> Lane {
        Lane::Scam
    }

    fn aggregate(&self, records: &[SignalRecord]) -> LaneVerdict {
        let peak = records
            .iter()
            .filter(|record| record.is_ok())
            .filter_map(|record| record.assessment.risk())
            .max();
        let (sources, excerpts) = collect_evidence(records);
        let (gaps, raw_errors) = status_gaps(records);

        LaneVerdict {
            lane: Lane::Scam,
            consensus: peak.map(Consensus::Risk).unwrap_or(Consensus::UnknownRisk),
            confidence_range: confidence_range(records),
            sources,
            excerpts,
            gaps,
            raw_errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ConfidenceRange, Evidence, SignalStatus};

    #[test]
    fn label_table() {
        assert_eq!(
            map_scam_label("Likely Scam"),
            Assessment::Scam(ScamVerdict::LikelyScam)
        );
        assert_eq!(map_scam_label("benign"), Assessment::Scam(ScamVerdict::Benign));
        assert_eq!(map_scam_label("HIGH"), Assessment::Risk(Risk::High));
        assert_eq!(map_scam_label("whatever"), Assessment::Unrated);
    }

    #[test]
    fn maximum_risk_across_ok_records() {
        let verdict = ScamLaneAggregator::new().aggregate(&[
            SignalRecord::ok("scam_tone", Assessment::Risk(Risk::Low), 0.4),
            SignalRecord::ok(
                "scam_web_reasoning",
                Assessment::Scam(ScamVerdict::Unclear),
                0.5,
            ),
            SignalRecord::ok("url_reputation", Assessment::Risk(Risk::Low), 0.4),
        ]);
        assert_eq!(verdict.consensus, Consensus::Risk(Risk::Medium));
    }

    #[test]
    fn non_ok_records_do_not_raise_risk() {
        let mut no_match = SignalRecord::ok(
            "scam_web_reasoning",
            Assessment::Scam(ScamVerdict::LikelyScam),
            0.3,
        )
        .with_status(SignalStatus::NoMatch);
        no_match.notes = "No known pattern".into();
        let verdict = ScamLaneAggregator::new().aggregate(&[
            SignalRecord::ok("scam_tone", Assessment::Risk(Risk::Low), 0.4),
            no_match,
        ]);
        assert_eq!(verdict.consensus, Consensus::Risk(Risk::Low));
        assert_eq!(
            verdict.gaps,
            vec!["scam_web_reasoning returned no match: No known pattern".to_string()]
        );
    }

    #[test]
    fn nothing_contributing_is_unknown() {
        let verdict = ScamLaneAggregator::new().aggregate(&[
            SignalRecord::no_data("url_reputation", "No URLs were provided in the submission."),
            SignalRecord::error(
                "scam_web_reasoning",
                "PERPLEXITY_API_KEY environment variable is not configured",
            ),
        ]);
        assert_eq!(verdict.consensus, Consensus::UnknownRisk);
        assert_eq!(verdict.confidence_range, ConfidenceRange::ZERO);
        assert_eq!(verdict.raw_errors.len(), 1);
    }

    #[test]
    fn flagged_urls_become_sources_and_excerpts_stay_separate() {
        let verdict = ScamLaneAggregator::new().aggregate(&[
            SignalRecord::ok("url_reputation", Assessment::Risk(Risk::High), 0.9).with_evidence(
                vec![Evidence::new("VirusTotal scan", "http://bad.example/login")
                    .with_snippet("3 engines flagged malicious")],
            ),
            SignalRecord::ok("scam_tone", Assessment::Risk(Risk::Medium), 0.55)
                .with_evidence(vec![Evidence::excerpt("urgency", "act within 24 hours")]),
        ]);
        assert_eq!(verdict.consensus, Consensus::Risk(Risk::High));
        assert_eq!(verdict.sources.len(), 1);
        assert_eq!(verdict.sources[0].url, "http://bad.example/login");
        assert_eq!(verdict.excerpts.len(), 1);
    }
}
