// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use kiln_core::{BuildId, BuildTarget, SlaveReport, WorkerId};
use serde::{Deserialize, Serialize};

/// One unit of work to distribute: a target and its cache fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanUnit {
    pub target: BuildTarget,
    pub fingerprint: String,
}

impl PlanUnit {
    pub fn new(target: BuildTarget, fingerprint: impl Into<String>) -> Self {
        Self { target, fingerprint: fingerprint.into() }
    }
}

/// Request from a client (CLI or worker) to the daemon
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Request {
    /// Health check
    Ping,

    /// Version handshake
    Hello { version: String },

    /// Register a new build job
    CreateJob,

    /// Check the cache and assign the remaining units to workers
    Distribute { id: BuildId, units: Vec<PlanUnit>, workers: Vec<WorkerId> },

    /// Status report from one worker
    Report { id: BuildId, worker: WorkerId, report: SlaveReport },

    Cancel {
        id: BuildId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },

    /// Snapshot of one job
    Status { id: BuildId },

    ListJobs,

    /// Request daemon shutdown
    Shutdown,
}
