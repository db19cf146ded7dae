// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Authoritative state of one distributed build.
//!
//! Writers (assignment, report ingestion, cancellation, timeout checks)
//! serialize on one mutex and publish an immutable snapshot after every
//! change. Status queries read the published snapshot and never wait on a
//! writer that is mid-update.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::{Duration, Instant};

use kiln_core::{
    duration_ms, BuildId, BuildJob, BuildSlaveStatus, BuildTarget, Clock, FailureCause, JobPhase,
    JobResult, SlavePhase, SlaveReport, WorkerId,
};
use kiln_wire::BuildStatusResponse;
use parking_lot::{Mutex, RwLock};
use thiserror::Error;

use crate::aggregate::aggregate_phase;
use crate::ingest::{apply_report, IngestError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordinatorError {
    #[error("job {id} already finished as {phase}")]
    AlreadyTerminal { id: BuildId, phase: JobPhase },
    #[error("worker {0} has already finished and cannot take more work")]
    WorkerFinished(WorkerId),
    #[error("no targets to assign to worker {0}")]
    EmptyAssignment(WorkerId),
}

struct JobState {
    job: BuildJob,
    /// Every failure seen, in observation order
    failures: Vec<FailureCause>,
    timed_out: bool,
    cancel_reason: Option<String>,
    last_progress: Instant,
    finished_at: Option<Instant>,
}

pub struct JobCoordinator<C: Clock> {
    id: BuildId,
    clock: C,
    progress_timeout: Duration,
    state: Mutex<JobState>,
    published: RwLock<Arc<BuildJob>>,
}

impl<C: Clock> JobCoordinator<C> {
    pub fn new(id: BuildId, clock: C, progress_timeout: Duration) -> Self {
        let job = BuildJob::new(id.clone(), clock.epoch_ms());
        let published = RwLock::new(Arc::new(job.clone()));
        let state = JobState {
            job,
            failures: Vec::new(),
            timed_out: false,
            cancel_reason: None,
            last_progress: clock.now(),
            finished_at: None,
        };
        Self { id, clock, progress_timeout, state: Mutex::new(state), published }
    }

    pub fn id(&self) -> &BuildId {
        &self.id
    }

    /// The last published state.
    pub fn job(&self) -> Arc<BuildJob> {
        Arc::clone(&self.published.read())
    }

    pub fn snapshot(&self) -> BuildStatusResponse {
        let job = self.job();
        tracing::debug!(job_id = %self.id, phase = %job.phase, "status query");
        BuildStatusResponse::of(BuildJob::clone(&job))
    }

    pub fn phase(&self) -> JobPhase {
        self.published.read().phase
    }

    pub fn is_terminal(&self) -> bool {
        self.phase().is_terminal()
    }

    /// Monotonic time the job reached a terminal phase.
    pub fn finished_at(&self) -> Option<Instant> {
        self.state.lock().finished_at
    }

    /// Give `targets` to `worker`, creating its slot or extending it.
    pub fn assign(
        &self,
        worker: WorkerId,
        targets: BTreeSet<BuildTarget>,
    ) -> Result<JobPhase, CoordinatorError> {
        self.apply_plan(BTreeSet::new(), BTreeMap::from([(worker, targets)]))
    }

    /// Record cache hits and hand out every assignment under one lock.
    ///
    /// Every assignment is checked before anything changes, so a plan is
    /// either applied whole or not at all.
    pub fn apply_plan(
        &self,
        cache_hits: BTreeSet<BuildTarget>,
        assignments: BTreeMap<WorkerId, BTreeSet<BuildTarget>>,
    ) -> Result<JobPhase, CoordinatorError> {
        let mut state = self.state.lock();
        if state.job.is_terminal() {
            return Err(CoordinatorError::AlreadyTerminal {
                id: self.id.clone(),
                phase: state.job.phase,
            });
        }
        for (worker, targets) in &assignments {
            if targets.is_empty() {
                return Err(CoordinatorError::EmptyAssignment(worker.clone()));
            }
            if state.job.slaves.get(worker).is_some_and(BuildSlaveStatus::is_terminal) {
                return Err(CoordinatorError::WorkerFinished(worker.clone()));
            }
        }

        state.job.cache_hits.extend(cache_hits);
        let now_ms = self.clock.epoch_ms();
        for (worker, targets) in assignments {
            tracing::info!(job_id = %self.id, worker = %worker, targets = targets.len(), "assigned work");
            match state.job.slaves.get_mut(&worker) {
                Some(slot) => {
                    slot.assigned.extend(targets);
                    slot.updated_at_ms = now_ms;
                }
                None => {
                    let slot = BuildSlaveStatus::new(worker.clone(), targets, now_ms);
                    state.job.slaves.insert(worker, slot);
                }
            }
            state.last_progress = self.clock.now();
        }

        self.recompute(&mut state);
        self.publish(&state);
        Ok(state.job.phase)
    }

    /// Apply a worker report and return the resulting job phase.
    ///
    /// Reports reaching a finished job are still applied to the worker's
    /// record, but the job phase and its primary failure stay frozen.
    pub fn ingest(&self, worker: &WorkerId, report: &SlaveReport) -> Result<JobPhase, IngestError> {
        let now_ms = self.clock.epoch_ms();
        let mut state = self.state.lock();
        let Some(slot) = state.job.slaves.get_mut(worker) else {
            tracing::warn!(job_id = %self.id, worker = %worker, "report from unassigned worker");
            return Err(IngestError::UnknownWorker(worker.clone()));
        };

        let transition = match apply_report(slot, report, now_ms) {
            Ok(transition) => transition,
            Err(e) => {
                slot.rejected_reports += 1;
                tracing::warn!(
                    job_id = %self.id,
                    worker = %worker,
                    timestamp = report.timestamp,
                    reported = %report.phase,
                    error = %e,
                    "rejected worker report"
                );
                self.publish(&state);
                return Err(e);
            }
        };

        if transition.from != transition.to {
            tracing::info!(
                job_id = %self.id,
                worker = %worker,
                from = %transition.from,
                to = %transition.to,
                "worker phase changed"
            );
        }
        for cause in &transition.new_failures {
            tracing::warn!(job_id = %self.id, worker = %worker, cause = %cause.log(), "failure reported");
        }

        let terminal = state.job.is_terminal();
        state.failures.extend(transition.new_failures.iter().cloned());
        if terminal {
            if let Some(JobResult::Failure { additional, .. }) = &mut state.job.result {
                additional.extend(transition.new_failures);
            }
        } else {
            state.last_progress = self.clock.now();
            self.recompute(&mut state);
        }
        self.publish(&state);
        Ok(state.job.phase)
    }

    /// Cancel the job immediately.
    pub fn cancel(&self, reason: Option<String>) -> Result<(), CoordinatorError> {
        let mut state = self.state.lock();
        if state.job.is_terminal() {
            return Err(CoordinatorError::AlreadyTerminal {
                id: self.id.clone(),
                phase: state.job.phase,
            });
        }
        state.job.cancelled = true;
        state.cancel_reason = reason;
        self.recompute(&mut state);
        self.publish(&state);
        Ok(())
    }

    /// Fail the job when no progress arrived within the timeout window.
    ///
    /// Returns true when this call timed the job out.
    pub fn check_timeout(&self, now: Instant) -> bool {
        let mut state = self.state.lock();
        if !state.job.phase.is_timed() {
            return false;
        }
        let idle = now.saturating_duration_since(state.last_progress);
        if idle < self.progress_timeout {
            return false;
        }

        let outstanding = state.job.outstanding_workers();
        let cause = FailureCause::Timeout { idle_ms: duration_ms(idle), outstanding };
        tracing::warn!(job_id = %self.id, cause = %cause.log(), "job timed out");
        state.failures.push(cause);
        state.timed_out = true;
        self.recompute(&mut state);
        self.publish(&state);
        true
    }

    fn recompute(&self, state: &mut JobState) {
        let before = state.job.phase;
        let after = aggregate_phase(
            before,
            state.job.slaves.values().map(|s| s.phase),
            state.job.cancelled,
            state.timed_out,
        );
        if after == before {
            return;
        }
        state.job.phase = after;
        if after.is_terminal() {
            state.job.result = Some(self.result_for(state, after));
            state.job.finished_at_ms = Some(self.clock.epoch_ms());
            state.finished_at = Some(self.clock.now());
        }
        tracing::info!(job_id = %self.id, from = %before, to = %after, "job phase changed");
    }

    fn result_for(&self, state: &JobState, phase: JobPhase) -> JobResult {
        match phase {
            JobPhase::Cancelled => JobResult::Cancelled { reason: state.cancel_reason.clone() },
            JobPhase::FinishedFailure => {
                let mut causes = state.failures.iter().cloned();
                let primary = causes.next().unwrap_or_else(|| unattributed_failure(&state.job));
                JobResult::Failure { primary, additional: causes.collect() }
            }
            _ => JobResult::Success,
        }
    }

    fn publish(&self, state: &JobState) {
        *self.published.write() = Arc::new(state.job.clone());
    }
}

/// Cause for a failed job whose workers never named one.
fn unattributed_failure(job: &BuildJob) -> FailureCause {
    let worker = job
        .slaves
        .values()
        .find(|s| s.phase == SlavePhase::FinishedFailure)
        .map(|s| s.worker.clone())
        .unwrap_or_else(|| WorkerId::new("unknown"));
    FailureCause::WorkerFailed { worker, reason: "worker reported failure".to_string() }
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;
