//! Per-submission state.
//!
//! Each slot is written at most once by its single producer: the orchestrator
//! for the lane selection, each lane for its own verdict, the assembler for
//! the report. A second write is refused instead of overwriting.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::model::{Lane, LaneVerdict, VerificationReport};
use crate::select::LaneSelection;

/// State key of the final report.
pub const FINAL_REPORT_KEY: &str = "final_report";
const SELECTION_KEY: &str = "lane_selection";

#[derive(Debug, Clone)]
pub struct SubmissionContext {
    submission_id: Uuid,
    claim: String,
    received_at: DateTime<Utc>,
    selection: Option<LaneSelection>,
    verdicts: BTreeMap<Lane, LaneVerdict>,
    report: Option<VerificationReport>,
}

impl SubmissionContext {
    pub fn new(claim: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), claim, Utc::now())
    }

    pub fn with_id(
        submission_id: Uuid,
        claim: impl Into<String>,
        received_at: DateTime<Utc>,
    ) -> Self {
        Self {
            submission_id,
            claim: claim.into(),
            received_at,
            selection: None,
            verdicts: BTreeMap::new(),
            report: None,
        }
    }

    pub fn submission_id(&self) -> Uuid {
        self.submission_id
    }

    pub fn claim(&self) -> &str {
        &self.claim
    }

    pub fn received_at(&self) -> DateTime<Utc> {
        self.received_at
    }

    pub fn selection(&self) -> Option<&LaneSelection> {
        self.selection.as_ref()
    }

    pub fn verdict(&self, lane: Lane) -> Option<&LaneVerdict> {
        self.verdicts.get(&lane)
    }

    pub fn verdicts(&self) -> &BTreeMap<Lane, LaneVerdict> {
        &self.verdicts
    }

    pub fn report(&self) -> Option<&VerificationReport> {
        self.report.as_ref()
    }

    pub fn record_selection(&mut self, selection: LaneSelection) -> EngineResult<()> {
        if self.selection.is_some() {
            return Err(already_written(SELECTION_KEY));
        }
        self.selection = Some(selection);
        Ok(())
    }

    pub fn put_verdict(&mut self, verdict: LaneVerdict) -> EngineResult<()> {
        let lane = verdict.lane;
        if self.verdicts.contains_key(&lane) {
            return Err(already_written(lane.state_key()));
        }
        self.verdicts.insert(lane, verdict);
        Ok(())
    }

    pub fn put_report(&mut self, report: VerificationReport) -> EngineResult<()> {
        if self.report.is_some() {
            return Err(already_written(FINAL_REPORT_KEY));
        }
        self.report = Some(report);
        Ok(())
    }
}

fn already_written(key: &str) -> EngineError {
    EngineError::AlreadyWritten {
        key: key.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ConfidenceRange, Consensus, Verdict};

    fn verdict(lane: Lane) -> LaneVerdict {
        LaneVerdict {
            lane,
            consensus: Consensus::Verdict(Verdict::Unknown),
            confidence_range: ConfidenceRange::ZERO,
            sources: Vec::new(),
            excerpts: Vec::new(),
            gaps: Vec::new(),
            raw_errors: Vec::new(),
        }
    }

    #[test]
    fn verdict_slots_are_write_once() {
        let mut ctx = SubmissionContext::new("The moon is made of cheese");
        ctx.put_verdict(verdict(Lane::Fact)).unwrap();
        let err = ctx.put_verdict(verdict(Lane::Fact)).unwrap_err();
        assert_eq!(
            err,
            EngineError::AlreadyWritten {
                key: "fact_check_summary".into()
            }
        );
        ctx.put_verdict(verdict(Lane::News)).unwrap();
        assert_eq!(ctx.verdicts().len(), 2);
    }

    #[test]
    fn selection_is_recorded_once() {
        let mut ctx = SubmissionContext::new("claim");
        ctx.record_selection(LaneSelection::new([Lane::Fact])).unwrap();
        assert!(ctx
            .record_selection(LaneSelection::new([Lane::News]))
            .is_err());
        assert!(ctx.selection().unwrap().contains(Lane::Fact));
        assert!(!ctx.selection().unwrap().contains(Lane::News));
    }

    #[test]
    fn with_id_keeps_identity() {
        let id = Uuid::new_v4();
        let at = Utc::now();
        let ctx = SubmissionContext::with_id(id, "claim", at);
        assert_eq!(ctx.submission_id(), id);
        assert_eq!(ctx.received_at(), at);
        assert_eq!(ctx.claim(), "claim");
        assert!(ctx.report().is_none());
    }
}
