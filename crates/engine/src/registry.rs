// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Every job the coordinator knows about.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Instant;

use kiln_core::{BuildId, BuildJob, BuildTarget, Clock, JobPhase, SlaveReport, WorkerId};
use kiln_wire::BuildStatusResponse;
use parking_lot::RwLock;
use thiserror::Error;

use crate::config::CoordinatorConfig;
use crate::coordinator::{CoordinatorError, JobCoordinator};
use crate::ingest::IngestError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("job capacity exhausted ({max} jobs)")]
    Exhausted { max: usize },
    #[error("unknown job {0}")]
    UnknownJob(BuildId),
    #[error(transparent)]
    Coordinator(#[from] CoordinatorError),
    #[error(transparent)]
    Ingest(#[from] IngestError),
}

impl RegistryError {
    /// The coordinator cannot take on more state. Everything else is a
    /// per-request problem.
    pub fn is_fatal(&self) -> bool {
        matches!(self, RegistryError::Exhausted { .. })
    }
}

/// What one sweep did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepStats {
    pub timed_out: Vec<BuildId>,
    pub evicted: Vec<BuildId>,
}

pub struct JobRegistry<C: Clock> {
    clock: C,
    config: CoordinatorConfig,
    jobs: RwLock<HashMap<BuildId, Arc<JobCoordinator<C>>>>,
}

impl<C: Clock> JobRegistry<C> {
    pub fn new(clock: C, config: CoordinatorConfig) -> Self {
        Self { clock, config, jobs: RwLock::new(HashMap::new()) }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.jobs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.read().is_empty()
    }

    /// Start tracking a new job in phase `Created`.
    pub fn create_job(&self) -> Result<BuildId, RegistryError> {
        let mut jobs = self.jobs.write();
        if jobs.len() >= self.config.max_jobs {
            tracing::error!(max = self.config.max_jobs, "job capacity exhausted");
            return Err(RegistryError::Exhausted { max: self.config.max_jobs });
        }
        let id = BuildId::new();
        let coordinator =
            JobCoordinator::new(id.clone(), self.clock.clone(), self.config.progress_timeout);
        jobs.insert(id.clone(), Arc::new(coordinator));
        tracing::info!(job_id = %id, jobs = jobs.len(), "created job");
        Ok(id)
    }

    pub fn get(&self, id: &BuildId) -> Option<Arc<JobCoordinator<C>>> {
        self.jobs.read().get(id).cloned()
    }

    fn require(&self, id: &BuildId) -> Result<Arc<JobCoordinator<C>>, RegistryError> {
        self.get(id).ok_or_else(|| RegistryError::UnknownJob(id.clone()))
    }

    /// Status envelope for `id`; empty when the job is unknown or evicted.
    pub fn snapshot(&self, id: &BuildId) -> BuildStatusResponse {
        match self.get(id) {
            Some(coordinator) => coordinator.snapshot(),
            None => {
                tracing::debug!(job_id = %id, "status query for unknown job");
                BuildStatusResponse::empty()
            }
        }
    }

    /// Published state of every job, oldest first.
    pub fn list(&self) -> Vec<Arc<BuildJob>> {
        let mut jobs: Vec<Arc<BuildJob>> = self.jobs.read().values().map(|c| c.job()).collect();
        jobs.sort_by(|a, b| a.created_at_ms.cmp(&b.created_at_ms).then_with(|| a.id.cmp(&b.id)));
        jobs
    }

    pub fn assign(
        &self,
        id: &BuildId,
        worker: WorkerId,
        targets: BTreeSet<BuildTarget>,
    ) -> Result<JobPhase, RegistryError> {
        Ok(self.require(id)?.assign(worker, targets)?)
    }

    pub fn ingest(
        &self,
        id: &BuildId,
        worker: &WorkerId,
        report: &SlaveReport,
    ) -> Result<JobPhase, RegistryError> {
        Ok(self.require(id)?.ingest(worker, report)?)
    }

    pub fn cancel(&self, id: &BuildId, reason: Option<String>) -> Result<(), RegistryError> {
        Ok(self.require(id)?.cancel(reason)?)
    }

    /// Time out stalled jobs, then evict finished jobs past the retention window.
    pub fn sweep(&self, now: Instant) -> SweepStats {
        let coordinators: Vec<Arc<JobCoordinator<C>>> = self.jobs.read().values().cloned().collect();

        let mut stats = SweepStats::default();
        for coordinator in &coordinators {
            if coordinator.check_timeout(now) {
                stats.timed_out.push(coordinator.id().clone());
            }
        }

        let expired: Vec<BuildId> = coordinators
            .iter()
            .filter(|c| {
                c.finished_at()
                    .is_some_and(|at| now.saturating_duration_since(at) >= self.config.retention)
            })
            .map(|c| c.id().clone())
            .collect();
        if !expired.is_empty() {
            let mut jobs = self.jobs.write();
            for id in &expired {
                if jobs.remove(id).is_some() {
                    tracing::info!(job_id = %id, "evicted finished job");
                    stats.evicted.push(id.clone());
                }
            }
        }
        stats
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
