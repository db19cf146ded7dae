// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Distributed build job phases and state.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use crate::id::BuildId;
use crate::slave::{BuildSlaveStatus, SlavePhase, WorkerId};
use crate::target::BuildTarget;

/// Aggregated lifecycle phase of a distributed build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobPhase {
    Created,
    Distributing,
    Building,
    FinishedSuccess,
    FinishedFailure,
    Cancelled,
}

impl JobPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobPhase::FinishedSuccess | JobPhase::FinishedFailure | JobPhase::Cancelled)
    }

    /// Phases in which a stalled job is failed by the progress timeout.
    pub fn is_timed(self) -> bool {
        matches!(self, JobPhase::Distributing | JobPhase::Building)
    }
}

crate::simple_display! {
    JobPhase {
        Created => "created",
        Distributing => "distributing",
        Building => "building",
        FinishedSuccess => "finished-success",
        FinishedFailure => "finished-failure",
        Cancelled => "cancelled",
    }
}

/// Why a job (or part of it) failed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureCause {
    /// A worker reported a failed target
    TargetFailed { worker: WorkerId, target: BuildTarget, reason: String },
    /// A worker failed without naming a target
    WorkerFailed { worker: WorkerId, reason: String },
    /// No progress within the configured window
    Timeout { idle_ms: u64, outstanding: Vec<WorkerId> },
}

impl FailureCause {
    pub fn log(&self) -> String {
        match self {
            FailureCause::TargetFailed { worker, target, reason } => {
                format!("{} failed on {}: {}", target, worker, reason)
            }
            FailureCause::WorkerFailed { worker, reason } => {
                format!("worker {} failed: {}", worker, reason)
            }
            FailureCause::Timeout { idle_ms, outstanding } => {
                let names: Vec<&str> = outstanding.iter().map(WorkerId::as_str).collect();
                format!("no progress for {}ms (waiting on {})", idle_ms, names.join(", "))
            }
        }
    }
}

/// Terminal outcome of a job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum JobResult {
    Success,
    Failure {
        primary: FailureCause,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        additional: Vec<FailureCause>,
    },
    Cancelled {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
}

/// Authoritative state of one distributed build.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BuildJob {
    pub id: BuildId,
    pub phase: JobPhase,
    pub created_at_ms: u64,
    #[serde(default)]
    pub slaves: BTreeMap<WorkerId, BuildSlaveStatus>,
    #[serde(default)]
    pub cancelled: bool,
    /// Work units skipped because the artifact cache already had them
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub cache_hits: BTreeSet<BuildTarget>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<JobResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at_ms: Option<u64>,
}

/// A [`BuildJob`] whose fields contradict each other.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("build job id is empty")]
    EmptyId,
    #[error("slave entry '{key}' holds status for worker '{worker}'")]
    SlaveKeyMismatch { key: WorkerId, worker: WorkerId },
    #[error("job in phase {0} must carry a result")]
    MissingResult(JobPhase),
    #[error("job in phase {0} must not carry a result")]
    UnexpectedResult(JobPhase),
    #[error("result does not match phase {0}")]
    ResultMismatch(JobPhase),
    #[error("job is flagged cancelled but in phase {0}")]
    CancelledFlag(JobPhase),
}

impl BuildJob {
    pub fn new(id: BuildId, created_at_ms: u64) -> Self {
        Self {
            id,
            phase: JobPhase::Created,
            created_at_ms,
            slaves: BTreeMap::new(),
            cancelled: false,
            cache_hits: BTreeSet::new(),
            result: None,
            finished_at_ms: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.phase.is_terminal()
    }

    /// Workers that have not reached a terminal phase.
    pub fn outstanding_workers(&self) -> Vec<WorkerId> {
        self.slaves.values().filter(|s| !s.is_terminal()).map(|s| s.worker.clone()).collect()
    }

    /// Number of workers in the given phase.
    pub fn count_in(&self, phase: SlavePhase) -> usize {
        self.slaves.values().filter(|s| s.phase == phase).count()
    }

    /// The first observed failure, if the job failed.
    pub fn primary_failure(&self) -> Option<&FailureCause> {
        match &self.result {
            Some(JobResult::Failure { primary, .. }) => Some(primary),
            _ => None,
        }
    }

    /// Check that the job's fields agree with each other.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.is_empty() {
            return Err(ValidationError::EmptyId);
        }
        for (key, status) in &self.slaves {
            if *key != status.worker {
                return Err(ValidationError::SlaveKeyMismatch {
                    key: key.clone(),
                    worker: status.worker.clone(),
                });
            }
        }
        if self.cancelled && self.phase != JobPhase::Cancelled {
            return Err(ValidationError::CancelledFlag(self.phase));
        }
        match (&self.result, self.phase) {
            (None, phase) if phase.is_terminal() => Err(ValidationError::MissingResult(phase)),
            (Some(_), phase) if !phase.is_terminal() => {
                Err(ValidationError::UnexpectedResult(phase))
            }
            (Some(JobResult::Success), JobPhase::FinishedSuccess)
            | (Some(JobResult::Failure { .. }), JobPhase::FinishedFailure)
            | (Some(JobResult::Cancelled { .. }), JobPhase::Cancelled)
            | (None, _) => Ok(()),
            (Some(_), phase) => Err(ValidationError::ResultMismatch(phase)),
        }
    }
}

crate::builder! {
    BuildJob => BuildJobBuilder {
        id: BuildId = BuildId::from_string("bld-test"),
        phase: JobPhase = JobPhase::Created,
        created_at_ms: u64 = 1_000_000,
        slaves: BTreeMap<WorkerId, BuildSlaveStatus> = BTreeMap::new(),
        cancelled: bool = false,
        cache_hits: BTreeSet<BuildTarget> = BTreeSet::new(),
        result: Option<JobResult> = None,
        finished_at_ms: Option<u64> = None,
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
