// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Turning a build plan into worker assignments.

use std::collections::{BTreeMap, BTreeSet};

use kiln_adapters::{ArtifactCache, CacheResult, Fingerprint};
use kiln_core::{BuildTarget, Clock, WorkerId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::coordinator::{CoordinatorError, JobCoordinator};
use crate::partition::{partition, PartitionError};

/// One target of a build plan and the key of its output in the artifact cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkUnit {
    pub target: BuildTarget,
    pub fingerprint: Fingerprint,
}

impl WorkUnit {
    pub fn new(target: BuildTarget, fingerprint: impl Into<Fingerprint>) -> Self {
        Self { target, fingerprint: fingerprint.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DistributeError {
    #[error(transparent)]
    Partition(#[from] PartitionError),
    #[error(transparent)]
    Coordinator(#[from] CoordinatorError),
}

/// What a distribution did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionSummary {
    pub cached: BTreeSet<BuildTarget>,
    pub assignments: BTreeMap<WorkerId, BTreeSet<BuildTarget>>,
}

impl DistributionSummary {
    pub fn assigned_count(&self) -> usize {
        self.assignments.values().map(BTreeSet::len).sum()
    }
}

/// Consults the artifact cache, then assigns whatever still needs building.
pub struct Distributor<A: ArtifactCache> {
    cache: A,
}

impl<A: ArtifactCache> Distributor<A> {
    pub fn new(cache: A) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &A {
        &self.cache
    }

    /// Assign the uncached units of `plan` across `workers`.
    ///
    /// Cache lookups that fail count as misses. When every unit is cached
    /// nothing is assigned and the job stays where it was.
    pub async fn distribute<C: Clock>(
        &self,
        coordinator: &JobCoordinator<C>,
        plan: &[WorkUnit],
        workers: &[WorkerId],
    ) -> Result<DistributionSummary, DistributeError> {
        let mut cached = BTreeSet::new();
        let mut misses = BTreeSet::new();
        for unit in plan {
            match self.cache.fetch(&unit.fingerprint).await {
                Ok(CacheResult::Hit(_)) => {
                    tracing::debug!(job_id = %coordinator.id(), target = %unit.target, "cache hit");
                    cached.insert(unit.target.clone());
                }
                Ok(CacheResult::Miss) => {
                    misses.insert(unit.target.clone());
                }
                Err(e) => {
                    tracing::warn!(
                        job_id = %coordinator.id(),
                        target = %unit.target,
                        error = %e,
                        "cache lookup failed, building target"
                    );
                    misses.insert(unit.target.clone());
                }
            }
        }
        // A target also cached under another fingerprint still needs building
        let cached: BTreeSet<BuildTarget> = cached.difference(&misses).cloned().collect();

        let assignments = if misses.is_empty() { BTreeMap::new() } else { partition(misses, workers)? };
        coordinator.apply_plan(cached.clone(), assignments.clone())?;
        tracing::info!(
            job_id = %coordinator.id(),
            cached = cached.len(),
            workers = assignments.len(),
            "distributed build plan"
        );
        Ok(DistributionSummary { cached, assignments })
    }
}

#[cfg(test)]
#[path = "distribute_tests.rs"]
mod tests;
