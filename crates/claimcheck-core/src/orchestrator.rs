//! Orchestrator
//!
//! Selects lanes once per submission, runs the selected lanes concurrently,
//! stores each lane verdict in the submission context and assembles the
//! report. `verify` always returns a report; lane-level failures end up in
//! `skipped_lanes`.

use futures::future::join_all;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use crate::aggregate::{aggregator_for, LaneAggregator};
use crate::assemble::ReportAssembler;
use crate::config::EngineConfig;
use crate::context::SubmissionContext;
use crate::error::{EngineError, EngineResult};
use crate::model::{ClaimOverview, Lane, LaneVerdict, SkipReason, SkippedLane, VerificationReport};
use crate::runner::LaneRunner;
use crate::select::{FixedSelector, LaneSelection, LaneSelector};
use crate::source::SignalSource;

pub struct OrchestratorBuilder {
    config: EngineConfig,
    lanes: BTreeMap<Lane, Vec<Arc<dyn SignalSource>>>,
    selector: Option<Arc<dyn LaneSelector>>,
}

impl OrchestratorBuilder {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            lanes: BTreeMap::new(),
            selector: None,
        }
    }

    /// Configure the sources of a lane. Order is significant: it is the order
    /// records reach the aggregator.
    pub fn lane(mut self, lane: Lane, sources: Vec<Arc<dyn SignalSource>>) -> Self {
        self.lanes.insert(lane, sources);
        self
    }

    pub fn lanes(mut self, lanes: BTreeMap<Lane, Vec<Arc<dyn SignalSource>>>) -> Self {
        self.lanes.extend(lanes);
        self
    }

    /// Defaults to selecting every lane.
    pub fn selector(mut self, selector: Arc<dyn LaneSelector>) -> Self {
        self.selector = Some(selector);
        self
    }

    pub fn build(self) -> Orchestrator {
        let config = self.config;
        let runners = self
            .lanes
            .into_iter()
            .map(|(lane, sources)| (lane, LaneRunner::new(lane, sources, &config)))
            .collect();
        let aggregators = Lane::ALL
            .into_iter()
            .map(|lane| (lane, aggregator_for(lane, &config)))
            .collect();

        Orchestrator {
            runners,
            aggregators,
            selector: self
                .selector
                .unwrap_or_else(|| Arc::new(FixedSelector::all())),
            assembler: ReportAssembler::new(&config),
        }
    }
}

pub struct Orchestrator {
    runners: BTreeMap<Lane, LaneRunner>,
    aggregators: BTreeMap<Lane, Box<dyn LaneAggregator>>,
    selector: Arc<dyn LaneSelector>,
    assembler: ReportAssembler,
}

impl Orchestrator {
    pub fn builder(config: EngineConfig) -> OrchestratorBuilder {
        OrchestratorBuilder::new(config)
    }

    /// Verify a claim in a fresh submission context.
    pub async fn verify_claim(&self, claim: &str) -> VerificationReport {
        let mut ctx = SubmissionContext::new(claim);
        self.verify(&mut ctx).await
    }

    /// Run the submission to completion.
    ///
    /// A context that already holds a report gets it back unchanged; lanes
    /// that already hold a verdict are not run again.
    #[tracing::instrument(skip(self, ctx), fields(submission_id = %ctx.submission_id()))]
    pub async fn verify(&self, ctx: &mut SubmissionContext) -> VerificationReport {
        if let Some(report) = ctx.report() {
            tracing::debug!("Report already assembled; returning stored report");
            return report.clone();
        }

        let started = Instant::now();
        let selection = self.selection_for(ctx);

        let pending: Vec<Lane> = selection
            .lanes()
            .filter(|lane| ctx.verdict(*lane).is_none())
            .collect();
        let claim = ctx.claim().to_string();
        let outcomes = join_all(
            pending
                .iter()
                .map(|lane| async { (*lane, self.run_lane(*lane, &claim).await) }),
        )
        .await;

        for (lane, outcome) in outcomes {
            let stored = outcome.and_then(|verdict| ctx.put_verdict(verdict));
            if let Err(err) = stored {
                tracing::warn!(lane = %lane, error = %err, "Lane produced no summary");
            }
        }

        let mut executed = Vec::new();
        let mut skipped = Vec::new();
        for lane in Lane::ALL {
            if !selection.contains(lane) {
                skipped.push(SkippedLane::new(lane, SkipReason::NotApplicable));
            } else if ctx.verdict(lane).is_some() {
                executed.push(lane);
            } else {
                skipped.push(SkippedLane::new(lane, SkipReason::MissingSummaryState));
            }
        }

        let overview = ClaimOverview {
            submission_id: ctx.submission_id(),
            submission_time: ctx.received_at(),
        };
        let report = match self.assembler.assemble(ctx.verdicts(), &executed, &skipped) {
            Ok(report) => report,
            Err(err) => {
                tracing::error!(error = %err, "Report assembly failed; returning degraded report");
                let degraded: Vec<SkippedLane> = executed
                    .iter()
                    .map(|lane| SkippedLane::new(*lane, SkipReason::MissingSummaryState))
                    .chain(skipped)
                    .collect();
                self.assembler.empty(&degraded)
            }
        }
        .with_claim_overview(overview);

        if let Err(err) = ctx.put_report(report.clone()) {
            tracing::warn!(error = %err, "Report slot already filled");
        }

        tracing::info!(
            executed = ?report.executed_lanes,
            outcome = %report.overall_outcome,
            sources = report.global_sources.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Verification complete"
        );

        report
    }

    /// The stored selection, or a new one recorded in the context.
    fn selection_for(&self, ctx: &mut SubmissionContext) -> LaneSelection {
        if let Some(selection) = ctx.selection() {
            return selection.clone();
        }
        let selection = self.selector.select(ctx.claim());
        if selection.is_empty() {
            tracing::warn!("No lanes selected; every lane will be reported as not applicable");
        } else {
            tracing::info!(lanes = ?selection.lanes().collect::<Vec<_>>(), "Lanes selected");
        }
        if let Err(err) = ctx.record_selection(selection.clone()) {
            tracing::warn!(error = %err, "Lane selection already recorded");
        }
        selection
    }

    async fn run_lane(&self, lane: Lane, claim: &str) -> EngineResult<LaneVerdict> {
        let runner = self
            .runners
            .get(&lane)
            .filter(|runner| !runner.is_empty())
            .ok_or_else(|| violation(lane, "no signal sources configured"))?;
        let records = runner.run(claim).await;
        if records.is_empty() {
            return Err(violation(lane, "lane produced no signal records"));
        }
        let aggregator = self
            .aggregators
            .get(&lane)
            .ok_or_else(|| violation(lane, "no aggregator registered"))?;
        Ok(aggregator.aggregate(&records))
    }
}

fn violation(lane: Lane, reason: &str) -> EngineError {
    EngineError::AggregationInvariantViolation {
        lane,
        reason: reason.to_string(),
    }
}
