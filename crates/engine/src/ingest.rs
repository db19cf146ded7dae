// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Applying worker reports to per-worker status.
//!
//! Reports are cumulative snapshots ordered by the worker's own timestamp.
//! An accepted report replaces the worker's record; a rejected one leaves it
//! untouched.

use kiln_core::{BuildSlaveStatus, FailureCause, SlavePhase, SlaveReport, WorkerId};
use thiserror::Error;

/// Why a report was not applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IngestError {
    #[error("stale report from {worker}: timestamp {timestamp} is not after {last}")]
    Stale { worker: WorkerId, timestamp: u64, last: u64 },
    #[error("report from {worker} says {reported} after it finished as {phase}")]
    AfterTerminal { worker: WorkerId, phase: SlavePhase, reported: SlavePhase },
    #[error("no work is assigned to worker {0}")]
    UnknownWorker(WorkerId),
}

/// What an accepted report changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlaveTransition {
    pub from: SlavePhase,
    pub to: SlavePhase,
    /// Failures this report revealed that earlier reports did not
    pub new_failures: Vec<FailureCause>,
}

impl SlaveTransition {
    /// An identical terminal phase reported again.
    pub fn is_refresh(&self) -> bool {
        self.from == self.to && self.to.is_terminal()
    }
}

/// Apply `report` to `status`. `status` changes only when the report is accepted.
pub fn apply_report(
    status: &mut BuildSlaveStatus,
    report: &SlaveReport,
    now_ms: u64,
) -> Result<SlaveTransition, IngestError> {
    if let Some(last) = status.last_report_ts.filter(|last| report.timestamp <= *last) {
        return Err(IngestError::Stale {
            worker: status.worker.clone(),
            timestamp: report.timestamp,
            last,
        });
    }
    if status.phase.is_terminal() && report.phase != status.phase {
        return Err(IngestError::AfterTerminal {
            worker: status.worker.clone(),
            phase: status.phase,
            reported: report.phase,
        });
    }

    let mut new_failures: Vec<FailureCause> = report
        .failed
        .iter()
        .filter(|(target, _)| !status.failed.contains_key(*target))
        .map(|(target, reason)| FailureCause::TargetFailed {
            worker: status.worker.clone(),
            target: target.clone(),
            reason: reason.clone(),
        })
        .collect();
    let entering_failure =
        report.phase == SlavePhase::FinishedFailure && status.phase != SlavePhase::FinishedFailure;
    if entering_failure && report.failed.is_empty() && status.failed.is_empty() {
        new_failures.push(FailureCause::WorkerFailed {
            worker: status.worker.clone(),
            reason: report.error.clone().unwrap_or_else(|| "worker reported failure".to_string()),
        });
    }

    let from = status.phase;
    status.phase = report.phase;
    status.completed = report.completed.clone();
    status.failed = report.failed.clone();
    status.error = report.error.clone();
    status.last_report_ts = Some(report.timestamp);
    status.updated_at_ms = now_ms;

    Ok(SlaveTransition { from, to: report.phase, new_failures })
}

#[cfg(test)]
#[path = "ingest_tests.rs"]
mod tests;
