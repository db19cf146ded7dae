// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Spread build targets over workers.

use std::collections::{BTreeMap, BTreeSet};

use kiln_core::{BuildTarget, WorkerId};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PartitionError {
    #[error("no workers available")]
    NoWorkers,
}

/// Assign each target, in target order, to the least-loaded worker.
///
/// Ties go to the smallest worker id, so the result depends only on the
/// inputs. Workers left without targets are omitted.
pub fn partition(
    targets: impl IntoIterator<Item = BuildTarget>,
    workers: &[WorkerId],
) -> Result<BTreeMap<WorkerId, BTreeSet<BuildTarget>>, PartitionError> {
    let workers: BTreeSet<&WorkerId> = workers.iter().collect();
    if workers.is_empty() {
        return Err(PartitionError::NoWorkers);
    }
    let targets: BTreeSet<BuildTarget> = targets.into_iter().collect();

    let mut load: BTreeMap<&WorkerId, BTreeSet<BuildTarget>> =
        workers.iter().map(|w| (*w, BTreeSet::new())).collect();
    for target in targets {
        // min_by_key keeps the first minimum, i.e. the smallest id
        let least = load.iter().min_by_key(|(_, assigned)| assigned.len()).map(|(w, _)| *w);
        if let Some(worker) = least {
            load.entry(worker).or_default().insert(target);
        }
    }

    Ok(load
        .into_iter()
        .filter(|(_, assigned)| !assigned.is_empty())
        .map(|(worker, assigned)| (worker.clone(), assigned))
        .collect())
}

#[cfg(test)]
#[path = "partition_tests.rs"]
mod tests;
