// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use std::collections::BTreeSet;

use crate::{BuildTarget, SlavePhase, SlaveReport, TargetNode};

// ── Proptest strategies ─────────────────────────────────────────────────

/// Proptest strategies for core types.
pub mod strategies {
    use crate::job::JobPhase;
    use crate::slave::SlavePhase;
    use crate::target::BuildTarget;
    use proptest::prelude::*;

    pub fn arb_job_phase() -> impl Strategy<Value = JobPhase> {
        prop_oneof![
            Just(JobPhase::Created),
            Just(JobPhase::Distributing),
            Just(JobPhase::Building),
            Just(JobPhase::FinishedSuccess),
            Just(JobPhase::FinishedFailure),
            Just(JobPhase::Cancelled),
        ]
    }

    pub fn arb_slave_phase() -> impl Strategy<Value = SlavePhase> {
        prop_oneof![
            Just(SlavePhase::Assigned),
            Just(SlavePhase::Building),
            Just(SlavePhase::FinishedSuccess),
            Just(SlavePhase::FinishedFailure),
        ]
    }

    /// Targets drawn from a small namespace so collisions are common.
    pub fn arb_build_target() -> impl Strategy<Value = BuildTarget> {
        ("[a-c]{1,2}", "[x-z]").prop_map(|(base, name)| BuildTarget::new(base, name))
    }

    /// Repository-relative file paths from a small namespace.
    pub fn arb_repo_path() -> impl Strategy<Value = String> {
        ("[a-c]", "[a-d]").prop_map(|(dir, file)| format!("{}/{}.java", dir, file))
    }
}

// ── Factories ───────────────────────────────────────────────────────────

/// `//<base>:<name>` target.
pub fn target(base: &str, name: &str) -> BuildTarget {
    BuildTarget::new(base, name)
}

/// Node declaring `inputs`.
pub fn node(fq_name: &str, inputs: &[&str]) -> TargetNode {
    let target = fq_name.parse().unwrap_or_else(|_| BuildTarget::new("//test", fq_name));
    TargetNode::new(target, inputs.iter().copied())
}

pub fn building_report(ts: u64) -> SlaveReport {
    SlaveReport::new(ts, SlavePhase::Building)
}

pub fn success_report(ts: u64, completed: &[BuildTarget]) -> SlaveReport {
    SlaveReport::new(ts, SlavePhase::FinishedSuccess).completed(completed.iter().cloned())
}

pub fn failure_report(ts: u64, target: BuildTarget, reason: &str) -> SlaveReport {
    SlaveReport::new(ts, SlavePhase::FinishedFailure).failed(target, reason)
}

pub fn target_set(targets: &[BuildTarget]) -> BTreeSet<BuildTarget> {
    targets.iter().cloned().collect()
}
