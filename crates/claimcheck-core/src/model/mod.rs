//! Value types shared by every stage of the pipeline.

mod lane;
mod report;
mod signal;
mod verdict;

pub use lane::Lane;
pub use report::{
    ClaimOverview, NumberedSource, OverallOutcome, SkipReason, SkippedLane, VerificationReport,
};
pub use signal::{
    clamp_confidence, Assessment, Evidence, Risk, ScamVerdict, SignalRecord, SignalStatus, Verdict,
};
pub use verdict::{ConfidenceRange, Consensus, LaneVerdict, SourceRef};
