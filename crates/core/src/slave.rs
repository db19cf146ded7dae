// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-worker ("build slave") status.
//!
//! A [`BuildSlaveStatus`] is owned by its job and only ever replaced through
//! report ingestion in the engine. Reports are cumulative snapshots from the
//! worker, so the newest accepted report is the whole truth for that worker.

use std::borrow::Borrow;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::target::BuildTarget;

/// Identifier of a remote build worker.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkerId(pub String);

impl WorkerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WorkerId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for WorkerId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl PartialEq<&str> for WorkerId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl Borrow<str> for WorkerId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Lifecycle phase of one worker within a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlavePhase {
    /// Work assigned, nothing reported yet
    Assigned,
    Building,
    FinishedSuccess,
    FinishedFailure,
}

impl SlavePhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, SlavePhase::FinishedSuccess | SlavePhase::FinishedFailure)
    }

    /// True once the worker has said anything about its progress.
    pub fn has_progressed(self) -> bool {
        !matches!(self, SlavePhase::Assigned)
    }
}

crate::simple_display! {
    SlavePhase {
        Assigned => "assigned",
        Building => "building",
        FinishedSuccess => "finished-success",
        FinishedFailure => "finished-failure",
    }
}

/// One status report from a worker.
///
/// `timestamp` is the worker's own logical clock; it must grow with every
/// report the worker sends for a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlaveReport {
    pub timestamp: u64,
    pub phase: SlavePhase,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub completed: BTreeSet<BuildTarget>,
    /// Failed targets and the reason each failed.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub failed: BTreeMap<BuildTarget, String>,
    /// Free-form failure reason when the worker failed outside any target.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SlaveReport {
    pub fn new(timestamp: u64, phase: SlavePhase) -> Self {
        Self {
            timestamp,
            phase,
            completed: BTreeSet::new(),
            failed: BTreeMap::new(),
            error: None,
        }
    }

    pub fn completed(mut self, targets: impl IntoIterator<Item = BuildTarget>) -> Self {
        self.completed.extend(targets);
        self
    }

    pub fn failed(mut self, target: BuildTarget, reason: impl Into<String>) -> Self {
        self.failed.insert(target, reason.into());
        self
    }

    pub fn error(mut self, reason: impl Into<String>) -> Self {
        self.error = Some(reason.into());
        self
    }
}

/// Last known state of one worker in one job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BuildSlaveStatus {
    pub worker: WorkerId,
    pub phase: SlavePhase,
    pub assigned: BTreeSet<BuildTarget>,
    #[serde(default)]
    pub completed: BTreeSet<BuildTarget>,
    #[serde(default)]
    pub failed: BTreeMap<BuildTarget, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Logical timestamp of the last accepted report
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_report_ts: Option<u64>,
    /// Wall-clock epoch ms of the last accepted change
    pub updated_at_ms: u64,
    /// Reports rejected as stale or post-terminal
    #[serde(default)]
    pub rejected_reports: u32,
}

impl BuildSlaveStatus {
    pub fn new(worker: WorkerId, assigned: BTreeSet<BuildTarget>, now_ms: u64) -> Self {
        Self {
            worker,
            phase: SlavePhase::Assigned,
            assigned,
            completed: BTreeSet::new(),
            failed: BTreeMap::new(),
            error: None,
            last_report_ts: None,
            updated_at_ms: now_ms,
            rejected_reports: 0,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.phase.is_terminal()
    }

    /// Assigned targets the worker has not yet reported on.
    pub fn outstanding(&self) -> impl Iterator<Item = &BuildTarget> {
        self.assigned
            .iter()
            .filter(|t| !self.completed.contains(*t) && !self.failed.contains_key(*t))
    }
}

crate::builder! {
    BuildSlaveStatus => BuildSlaveStatusBuilder {
        worker: WorkerId = WorkerId::new("worker-1"),
        phase: SlavePhase = SlavePhase::Assigned,
        assigned: BTreeSet<BuildTarget> = BTreeSet::new(),
        completed: BTreeSet<BuildTarget> = BTreeSet::new(),
        failed: BTreeMap<BuildTarget, String> = BTreeMap::new(),
        error: Option<String> = None,
        last_report_ts: Option<u64> = None,
        updated_at_ms: u64 = 1_000_000,
        rejected_reports: u32 = 0,
    }
}

#[cfg(test)]
#[path = "slave_tests.rs"]
mod tests;
