//! Lane Aggregators
//!
//! Fold the signal records of one lane into a [`LaneVerdict`]. Consensus is
//! lane-specific (truth tally for news/fact, maximum risk for scam); the
//! confidence range, source dedup and gap reporting are shared.

mod scam;
mod truth;

pub use scam::{map_scam_label, ScamLaneAggregator};
pub use truth::{map_rating, TruthLaneAggregator, VerdictTally};

use crate::config::EngineConfig;
use crate::model::{ConfidenceRange, Evidence, Lane, SignalRecord, SignalStatus, SourceRef};
use crate::url_key::UrlDeduper;

pub trait LaneAggregator: Send + Sync {
    fn lane(&self) -> Lane;

    /// Fold the lane's records, in configuration order, into one verdict.
    fn aggregate(&self, records: &[SignalRecord]) -> crate::model::LaneVerdict;
}

/// The aggregator owning a lane's vocabulary.
pub fn aggregator_for(lane: Lane, config: &EngineConfig) -> Box<dyn LaneAggregator> {
    match lane {
        Lane::News => Box::new(TruthLaneAggregator::news(config.tie_policy)),
        Lane::Fact => Box::new(TruthLaneAggregator::fact(config.tie_policy)),
        Lane::Scam => Box::new(ScamLaneAggregator::new()),
    }
}

/// Min/max confidence over non-error records; `[0, 0]` when none remain.
pub fn confidence_range(records: &[SignalRecord]) -> ConfidenceRange {
    ConfidenceRange::spanning(
        records
            .iter()
            .filter(|record| !record.is_error())
            .map(|record| record.confidence),
    )
    .unwrap_or(ConfidenceRange::ZERO)
}

/// Evidence of non-error records, split into deduplicated linkable sources
/// and non-linkable excerpts.
pub(crate) fn collect_evidence(records: &[SignalRecord]) -> (Vec<SourceRef>, Vec<Evidence>) {
    let mut deduper = UrlDeduper::new();
    let mut sources = Vec::new();
    let mut excerpts = Vec::new();

    for evidence in records
        .iter()
        .filter(|record| !record.is_error())
        .flat_map(|record| record.evidence.iter())
    {
        if evidence.is_linkable() {
            if deduper.admit(&evidence.url) {
                sources.push(SourceRef::from(evidence));
            }
        } else if evidence.snippet.is_some() {
            excerpts.push(evidence.clone());
        }
    }

    (sources, excerpts)
}

/// Gap notes for every non-ok record, plus verbatim error notes.
pub(crate) fn status_gaps(records: &[SignalRecord]) -> (Vec<String>, Vec<String>) {
    let mut gaps = Vec::new();
    let mut raw_errors = Vec::new();

    for record in records {
        let note = record.notes.trim();
        match record.status {
            SignalStatus::Ok => {}
            SignalStatus::Error => {
                gaps.push(format!("{} error: {}", record.source, record.notes));
                raw_errors.push(record.notes.clone());
            }
            status => {
                let label = match status {
                    SignalStatus::NoMatch => "no match",
                    _ => "no data",
                };
                if note.is_empty() {
                    gaps.push(format!("{} returned {}", record.source, label));
                } else {
                    gaps.push(format!("{} returned {}: {}", record.source, label, note));
                }
            }
        }
    }

    (gaps, raw_errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Assessment, Verdict};

    fn ok(source: &str, confidence: f64) -> SignalRecord {
        SignalRecord::ok(source, Assessment::Verdict(Verdict::True), confidence)
    }

    #[test]
    fn error_records_do_not_move_the_range() {
        let records = vec![
            ok("a", 0.8),
            SignalRecord::error("b", "boom"),
            ok("c", 0.6),
        ];
        assert_eq!(
            confidence_range(&records),
            ConfidenceRange { min: 0.6, max: 0.8 }
        );
    }

    #[test]
    fn all_errors_give_zero_range() {
        let records = vec![SignalRecord::error("a", "x"), SignalRecord::error("b", "y")];
        assert_eq!(confidence_range(&records), ConfidenceRange::ZERO);
    }

    #[test]
    fn error_evidence_is_not_corroboration() {
        let mut failed = SignalRecord::error("b", "boom");
        failed.evidence = vec![Evidence::new("Ghost", "https://ghost.example/")];
        let records = vec![
            ok("a", 0.5).with_evidence(vec![
                Evidence::new("Reuters", "https://reuters.com/x"),
                Evidence::excerpt("urgency", "act now"),
            ]),
            failed,
        ];
        let (sources, excerpts) = collect_evidence(&records);
        assert_eq!(sources, vec![SourceRef::new("Reuters", "https://reuters.com/x")]);
        assert_eq!(excerpts.len(), 1);
    }

    #[test]
    fn gaps_name_source_and_status() {
        let records = vec![
            ok("a", 0.5),
            SignalRecord::no_data("url_reputation", "No URLs were provided in the submission."),
            SignalRecord::error(
                "fact_registry",
                "GOOGLE_FACT_CHECK_API_KEY environment variable is not configured",
            ),
        ];
        let (gaps, raw_errors) = status_gaps(&records);
        assert_eq!(
            gaps,
            vec![
                "url_reputation returned no data: No URLs were provided in the submission."
                    .to_string(),
                concat!(
                    "fact_registry error: GOOGLE_FACT_CHECK_API_KEY ",
                    "environment variable is not configured"
                )
                .to_string(),
            ]
        );
        assert_eq!(
            raw_errors,
            vec!["GOOGLE_FACT_CHECK_API_KEY environment variable is not configured".to_string()]
        );
    }
}
