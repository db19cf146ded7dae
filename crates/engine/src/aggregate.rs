// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job phase as a function of its workers' phases.

use kiln_core::{JobPhase, SlavePhase};

/// Per-phase worker counts. Order of observation does not matter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PhaseCounts {
    pub assigned: usize,
    pub building: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl PhaseCounts {
    pub fn tally(phases: impl IntoIterator<Item = SlavePhase>) -> Self {
        phases.into_iter().fold(Self::default(), |mut counts, phase| {
            match phase {
                SlavePhase::Assigned => counts.assigned += 1,
                SlavePhase::Building => counts.building += 1,
                SlavePhase::FinishedSuccess => counts.succeeded += 1,
                SlavePhase::FinishedFailure => counts.failed += 1,
            }
            counts
        })
    }

    pub fn total(&self) -> usize {
        self.assigned + self.building + self.succeeded + self.failed
    }
}

/// Recompute the job phase from scratch.
///
/// A terminal `current` phase is returned unchanged. Otherwise, first match wins:
/// cancelled, then timed out or any failed worker, then no workers, then every
/// worker succeeded, then any worker past `Assigned`, else `Distributing`.
pub fn aggregate_phase(
    current: JobPhase,
    slaves: impl IntoIterator<Item = SlavePhase>,
    cancelled: bool,
    timed_out: bool,
) -> JobPhase {
    if current.is_terminal() {
        return current;
    }
    if cancelled {
        return JobPhase::Cancelled;
    }
    let counts = PhaseCounts::tally(slaves);
    if timed_out || counts.failed > 0 {
        JobPhase::FinishedFailure
    } else if counts.total() == 0 {
        JobPhase::Created
    } else if counts.succeeded == counts.total() {
        JobPhase::FinishedSuccess
    } else if counts.building + counts.succeeded > 0 {
        JobPhase::Building
    } else {
        JobPhase::Distributing
    }
}

#[cfg(test)]
#[path = "aggregate_tests.rs"]
mod tests;
