//! Multi-lane claim verification engine
//!
//! A submitted claim fans out to independent verification lanes (news, fact,
//! scam). Each lane runs its signal sources concurrently, folds their records
//! into a single lane verdict, and the assembler merges the lane verdicts into
//! one source-attributed report.
//!
//! ## Architecture
//!
//! ```text
//! Orchestrator → LaneRunner(news|fact|scam) → LaneAggregator → ReportAssembler
//!                     │ (parallel per source)
//!                     └── SignalSource × N
//! ```
//!
//! Provider HTTP clients live in `claimcheck-providers`; this crate only sees
//! them through the [`SignalSource`] trait.

pub mod aggregate;
pub mod assemble;
pub mod config;
pub mod context;
pub mod error;
pub mod model;
pub mod orchestrator;
pub mod payload;
pub mod render;
pub mod runner;
pub mod select;
pub mod source;
pub mod url_key;

// Re-exports for convenience
pub use aggregate::{aggregator_for, LaneAggregator};
pub use assemble::ReportAssembler;
pub use config::{EngineConfig, TiePolicy};
pub use context::SubmissionContext;
pub use error::{EngineError, EngineResult, SourceError};
pub use model::{
    Assessment, ClaimOverview, ConfidenceRange, Consensus, Evidence, Lane, LaneVerdict,
    NumberedSource, OverallOutcome, Risk, ScamVerdict, SignalRecord, SignalStatus, SkipReason,
    SkippedLane, SourceRef, Verdict, VerificationReport,
};
pub use orchestrator::{Orchestrator, OrchestratorBuilder};
pub use runner::LaneRunner;
pub use select::{FixedSelector, HeuristicSelector, LaneSelection, LaneSelector};
pub use source::SignalSource;
