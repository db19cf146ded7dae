// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::collections::BTreeMap;

use kiln_core::{BuildId, BuildJob, JobPhase, WorkerId};
use serde::{Deserialize, Serialize};

use crate::status::BuildStatusResponse;

/// Summary of one job for listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSummary {
    pub id: BuildId,
    pub phase: JobPhase,
    pub created_at_ms: u64,
    pub workers: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at_ms: Option<u64>,
}

impl From<&BuildJob> for JobSummary {
    fn from(job: &BuildJob) -> Self {
        Self {
            id: job.id.clone(),
            phase: job.phase,
            created_at_ms: job.created_at_ms,
            workers: job.slaves.len(),
            finished_at_ms: job.finished_at_ms,
        }
    }
}

/// Response from daemon to client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Response {
    /// Generic success
    Ok,

    /// Health check response
    Pong,

    /// Version handshake response
    Hello { version: String },

    /// Daemon is shutting down
    ShuttingDown,

    JobCreated { id: BuildId },

    /// Distribution outcome: units served from cache and per-worker target counts
    Distributed { cached: usize, assignments: BTreeMap<WorkerId, usize> },

    /// Report applied; carries the job phase afterwards
    Accepted { phase: JobPhase },

    /// Report or command refused; the job is unchanged
    Rejected { reason: String },

    /// Status envelope; carries no job when the id is unknown
    Status(BuildStatusResponse),

    Jobs { jobs: Vec<JobSummary> },

    /// Error response
    Error { message: String },
}
