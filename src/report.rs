//! Run summaries.
//!
//! Renders a [`RunReport`] as a human-readable table or as pretty JSON for the
//! plotting and aggregation tools that consume the per-round series.

use color_eyre::eyre::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::orchestrator::{RunReport, RunResult};
use crate::simulation::{AveragingOutcome, DisseminationOutcome};

/// Output format for the run summary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

/// Render `report` in the requested format
pub fn render(report: &RunReport, format: ReportFormat) -> Result<String> {
    match format {
        ReportFormat::Text => Ok(render_text(report)),
        ReportFormat::Json => render_json(report),
    }
}

/// Serialize the full report, per-round series included
pub fn render_json(report: &RunReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("Failed to serialize report to JSON")
}

/// Human-readable summary followed by the per-round table
pub fn render_text(report: &RunReport) -> String {
    let mut lines: Vec<String> = Vec::new();
    let metadata = &report.metadata;

    lines.push("=".repeat(60));
    lines.push(format!("  {} on {} ({} nodes)", metadata.protocol.to_uppercase(), metadata.topology.as_str(), metadata.nodes));
    lines.push("=".repeat(60));
    lines.push(format!("Scheduling: {:?}", metadata.scheduling));
    lines.push(format!("Seed: {}", metadata.seed));
    lines.push(String::new());

    match &report.result {
        RunResult::Dissemination(outcome) => push_dissemination(&mut lines, outcome, metadata.nodes),
        RunResult::Averaging(outcome) => push_averaging(&mut lines, outcome),
    }

    lines.join("\n")
}

fn push_dissemination(lines: &mut Vec<String>, outcome: &DisseminationOutcome, nodes: usize) {
    let reached = outcome.reached();
    lines.push(format!("Rounds to completion: {}", outcome.rounds()));
    lines.push(format!(
        "Final coverage: {}/{} ({:.1}%)",
        reached,
        nodes,
        100.0 * reached as f64 / nodes.max(1) as f64
    ));
    lines.push(format!("Total messages: {}", outcome.total_messages()));
    lines.push(String::new());

    lines.push(format!("{:>6} {:>8} {:>8} {:>8} {:>10}", "round", "S", "I", "R", "messages"));
    for record in &outcome.records {
        lines.push(format!(
            "{:>6} {:>8} {:>8} {:>8} {:>10}",
            record.round, record.susceptible, record.infected, record.removed, record.messages_sent
        ));
    }
}

fn push_averaging(lines: &mut Vec<String>, outcome: &AveragingOutcome) {
    lines.push(format!("True mean: {:.6}", outcome.mean));
    if let Some(final_rmse) = outcome.final_rmse() {
        lines.push(format!("Final RMSE: {:.6e}", final_rmse));
    }
    if let Some(last) = outcome.history.last() {
        lines.push(format!("Total messages: {}", last.messages_sent));
    }
    lines.push(String::new());

    lines.push(format!("{:>6} {:>14} {:>14} {:>10}", "round", "rmse", "mass mean", "messages"));
    for round in &outcome.history {
        lines.push(format!(
            "{:>6} {:>14.6e} {:>14.6} {:>10}",
            round.round, round.rmse, round.conserved_mean, round.messages_sent
        ));
    }
}

/// Print the report to stdout
pub fn print_report(report: &RunReport, format: ReportFormat) -> Result<()> {
    println!("{}", render(report, format)?);
    Ok(())
}
