//! Structured Markdown rendering of a [`VerificationReport`].
//!
//! Emits the fixed report skeleton from structure fields only. Every lane
//! appears (run or not), and every global source is printed with its exact URL.

use chrono::SecondsFormat;

use crate::model::{Consensus, Lane, LaneVerdict, SkipReason, VerificationReport};

pub fn markdown(report: &VerificationReport) -> String {
    let mut out = String::from("# Verification Report\n\n");

    out.push_str("## Claim Overview\n");
    match &report.claim_overview {
        Some(overview) => {
            out.push_str(&format!("- submission_id: {}\n", overview.submission_id));
            out.push_str(&format!(
                "- submission_time: {}\n\n",
                overview
                    .submission_time
                    .to_rfc3339_opts(SecondsFormat::Secs, true)
            ));
        }
        None => out.push_str("- submission_id: n/a\n- submission_time: n/a\n\n"),
    }

    for lane in Lane::ALL {
        out.push_str(&lane_section(report, lane));
    }

    out.push_str("## Lane Execution\n");
    out.push_str(&format!("- executed: {}\n", executed_list(report)));
    out.push_str(&format!("- skipped: {}\n\n", skipped_list(report)));

    out.push_str("## Final Verdict\n");
    out.push_str(&format!("- outcome: {}\n", report.overall_outcome));
    out.push_str(&format!("- truth_value: {}\n", report.truth_outcome));
    match report.scam_risk {
        Some(risk) => out.push_str(&format!("- scam_risk: {}\n", risk)),
        None if report.was_executed(Lane::Scam) => out.push_str("- scam_risk: unknown\n"),
        None => out.push_str("- scam_risk: not requested\n"),
    }
    out.push_str(&format!("- confidence: {}\n", report.overall_confidence_range));
    out.push_str("- residual_risks:\n");
    let risks = residual_risks(report);
    if risks.is_empty() {
        out.push_str("  * none\n");
    }
    for risk in risks {
        out.push_str(&format!("  * {}\n", risk));
    }
    out.push('\n');

    out.push_str("## Sources\n");
    if report.global_sources.is_empty() {
        out.push_str("none\n");
    }
    for source in &report.global_sources {
        out.push_str(&format!("{}. {} - {}\n", source.index, source.label, source.url));
    }

    out
}

fn lane_section(report: &VerificationReport, lane: Lane) -> String {
    let mut section = format!("## {}\n", lane.heading());
    let Some(verdict) = report.verdict(lane) else {
        let summary = match report.skip_reason(lane) {
            Some(SkipReason::MissingSummaryState) => SkipReason::MissingSummaryState.as_str(),
            _ => "not requested",
        };
        section.push_str(&format!("- summary: {}\n", summary));
        section.push_str("- confidence: n/a\n");
        section.push_str("- sources:\n  * none\n\n");
        return section;
    };

    section.push_str(&format!("- summary: {}\n", consensus_line(verdict)));
    if lane == Lane::Scam {
        let action = if report.immediate_action_required {
            "yes"
        } else {
            "no"
        };
        section.push_str(&format!("- immediate_action_required: {}\n", action));
    }
    section.push_str(&format!("- confidence: {}\n", verdict.confidence_range));
    section.push_str("- sources:\n");
    if verdict.sources.is_empty() {
        section.push_str("  * none\n");
    }
    for source in &verdict.sources {
        match report.source_index(&source.url) {
            Some(index) => {
                section.push_str(&format!("  * [{}] {} - {}\n", index, source.label, source.url))
            }
            None => section.push_str(&format!("  * {} - {}\n", source.label, source.url)),
        }
    }
    if !verdict.excerpts.is_empty() {
        section.push_str("- excerpts:\n");
        for excerpt in &verdict.excerpts {
            let text = excerpt.snippet.as_deref().unwrap_or_default();
            section.push_str(&format!("  * {}: \"{}\"\n", excerpt.label, text));
        }
    }
    if !verdict.gaps.is_empty() {
        section.push_str("- gaps:\n");
        for gap in &verdict.gaps {
            section.push_str(&format!("  * {}\n", gap));
        }
    }
    section.push('\n');
    section
}

fn consensus_line(verdict: &LaneVerdict) -> String {
    match verdict.consensus {
        Consensus::Verdict(value) => format!("verdict {}", value),
        Consensus::Risk(risk) => format!("{} risk", risk),
        Consensus::UnknownRisk => "risk unknown".to_string(),
    }
}

fn executed_list(report: &VerificationReport) -> String {
    if report.executed_lanes.is_empty() {
        return "none".to_string();
    }
    report
        .executed_lanes
        .iter()
        .map(Lane::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn skipped_list(report: &VerificationReport) -> String {
    if report.skipped_lanes.is_empty() {
        return "none".to_string();
    }
    report
        .skipped_lanes
        .iter()
        .map(|skipped| format!("{} ({})", skipped.lane, skipped.reason))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Gaps and raw errors of every executed lane, tagged with the lane.
fn residual_risks(report: &VerificationReport) -> Vec<String> {
    let mut risks = Vec::new();
    for verdict in report.lane_verdicts.values() {
        risks.extend(verdict.gaps.iter().map(|gap| format!("{}: {}", verdict.lane, gap)));
        for error in &verdict.raw_errors {
            let already_listed = verdict.gaps.iter().any(|gap| gap.ends_with(error.as_str()));
            if !already_listed {
                risks.push(format!("{}: {}", verdict.lane, error));
            }
        }
    }
    for skipped in &report.skipped_lanes {
        if skipped.reason == SkipReason::MissingSummaryState {
            risks.push(format!("{}: {}", skipped.lane, skipped.reason));
        }
    }
    risks
}
