// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::ValueEnum;
use kiln_core::{BuildJob, Clock, JobResult, SystemClock};
use kiln_wire::JobSummary;
use serde::Serialize;

#[derive(Clone, Copy, Debug, Default, PartialEq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Print `obj` as pretty JSON, or run `text` for the text format.
pub fn format_or_json<T: Serialize>(
    format: OutputFormat,
    obj: &T,
    text: impl FnOnce(),
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => text(),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(obj)?),
    }
    Ok(())
}

/// Format a timestamp as relative time (e.g., "5s", "2m", "1h", "3d")
pub fn format_time_ago(epoch_ms: u64, now_ms: u64) -> String {
    if epoch_ms == 0 {
        return "-".to_string();
    }
    kiln_core::format_elapsed_ms(now_ms.saturating_sub(epoch_ms))
}

pub fn now_ms() -> u64 {
    SystemClock.epoch_ms()
}

/// Job listing as an aligned table.
pub fn jobs_table(jobs: &[JobSummary], now_ms: u64) -> String {
    if jobs.is_empty() {
        return "No jobs\n".to_string();
    }
    let rows: Vec<[String; 4]> = jobs
        .iter()
        .map(|job| {
            [
                job.id.to_string(),
                job.phase.to_string(),
                job.workers.to_string(),
                format_time_ago(job.created_at_ms, now_ms),
            ]
        })
        .collect();
    let headers = ["ID", "PHASE", "WORKERS", "AGE"];
    let mut widths = headers.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    let mut out = String::new();
    let mut push_row = |cells: &[&str]| {
        let line: Vec<String> =
            cells.iter().zip(widths).map(|(cell, width)| format!("{:<width$}", cell)).collect();
        out.push_str(line.join("  ").trim_end());
        out.push('\n');
    };
    push_row(&headers);
    for row in &rows {
        let cells: Vec<&str> = row.iter().map(String::as_str).collect();
        push_row(&cells);
    }
    out
}

/// Human-readable status of one job.
pub fn job_text(job: &BuildJob) -> String {
    let mut out = format!("Job: {}\nPhase: {}\n", job.id, job.phase);
    if !job.cache_hits.is_empty() {
        out.push_str(&format!("Cached: {}\n", job.cache_hits.len()));
    }
    if !job.slaves.is_empty() {
        out.push_str("Workers:\n");
        for (worker, slave) in &job.slaves {
            out.push_str(&format!(
                "  {}  {}  {}/{} done",
                worker,
                slave.phase,
                slave.completed.len(),
                slave.assigned.len()
            ));
            if !slave.failed.is_empty() {
                out.push_str(&format!(", {} failed", slave.failed.len()));
            }
            out.push('\n');
        }
    }
    match &job.result {
        Some(JobResult::Failure { primary, additional }) => {
            out.push_str(&format!("Failure: {}\n", primary.log()));
            for cause in additional {
                out.push_str(&format!("  also: {}\n", cause.log()));
            }
        }
        Some(JobResult::Cancelled { reason: Some(reason) }) => {
            out.push_str(&format!("Cancelled: {}\n", reason));
        }
        _ => {}
    }
    out
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
