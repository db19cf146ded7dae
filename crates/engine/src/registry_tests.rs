// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use kiln_core::test_support::{building_report, success_report, target, target_set};
use kiln_core::FakeClock;
use std::time::Duration;

fn registry(config: CoordinatorConfig) -> JobRegistry<FakeClock> {
    JobRegistry::new(FakeClock::new(), config)
}

fn config() -> CoordinatorConfig {
    CoordinatorConfig::default()
        .progress_timeout(Duration::from_secs(10))
        .retention(Duration::from_secs(60))
        .max_jobs(4)
}

fn w1() -> WorkerId {
    WorkerId::new("w1")
}

#[test]
fn create_job_starts_created() {
    let registry = registry(config());
    let id = registry.create_job().unwrap();
    assert!(id.starts_with(BuildId::PREFIX));
    let status = registry.snapshot(&id);
    assert_eq!(status.build_job.map(|j| j.phase), Some(JobPhase::Created));
    assert_eq!(registry.len(), 1);
}

#[test]
fn capacity_exhaustion_is_fatal_class() {
    let registry = registry(config().max_jobs(2));
    registry.create_job().unwrap();
    registry.create_job().unwrap();
    let err = registry.create_job().unwrap_err();
    assert_eq!(err, RegistryError::Exhausted { max: 2 });
    assert!(err.is_fatal());
    assert_eq!(registry.len(), 2);
}

#[test]
fn unknown_job_yields_empty_envelope() {
    let registry = registry(config());
    assert_eq!(registry.snapshot(&BuildId::from_string("bld-missing")), BuildStatusResponse::empty());
}

#[test]
fn unknown_job_operations_error() {
    let registry = registry(config());
    let id = BuildId::from_string("bld-missing");
    let err = registry.cancel(&id, None).unwrap_err();
    assert_eq!(err, RegistryError::UnknownJob(id.clone()));
    assert!(!err.is_fatal());
    assert!(registry.ingest(&id, &w1(), &building_report(1)).is_err());
    assert!(registry.assign(&id, w1(), target_set(&[target("//a", "b")])).is_err());
}

#[test]
fn full_lifecycle_through_registry() {
    let registry = registry(config());
    let id = registry.create_job().unwrap();
    let lib = target("//a", "lib");

    assert_eq!(registry.assign(&id, w1(), target_set(&[lib.clone()])).unwrap(), JobPhase::Distributing);
    assert_eq!(registry.ingest(&id, &w1(), &building_report(1)).unwrap(), JobPhase::Building);
    assert_eq!(registry.ingest(&id, &w1(), &success_report(2, &[lib])).unwrap(), JobPhase::FinishedSuccess);

    let err = registry.ingest(&id, &w1(), &building_report(1)).unwrap_err();
    assert!(matches!(err, RegistryError::Ingest(IngestError::Stale { .. })));
    let err = registry.cancel(&id, None).unwrap_err();
    assert!(matches!(err, RegistryError::Coordinator(CoordinatorError::AlreadyTerminal { .. })));
}

#[test]
fn jobs_are_independent() {
    let registry = registry(config());
    let first = registry.create_job().unwrap();
    let second = registry.create_job().unwrap();
    registry.cancel(&first, None).unwrap();

    assert_eq!(registry.snapshot(&first).build_job.map(|j| j.phase), Some(JobPhase::Cancelled));
    assert_eq!(registry.snapshot(&second).build_job.map(|j| j.phase), Some(JobPhase::Created));
    assert_eq!(registry.list().len(), 2);
}

#[test]
fn sweep_times_out_stalled_jobs() {
    let registry = registry(config());
    let id = registry.create_job().unwrap();
    registry.assign(&id, w1(), target_set(&[target("//a", "b")])).unwrap();

    registry.clock().advance(Duration::from_secs(10));
    let stats = registry.sweep(registry.clock().now());
    assert_eq!(stats.timed_out, vec![id.clone()]);
    assert!(stats.evicted.is_empty());
    assert_eq!(registry.snapshot(&id).build_job.map(|j| j.phase), Some(JobPhase::FinishedFailure));
}

#[test]
fn sweep_evicts_finished_jobs_after_retention() {
    let registry = registry(config());
    let done = registry.create_job().unwrap();
    let live = registry.create_job().unwrap();
    registry.cancel(&done, None).unwrap();

    registry.clock().advance(Duration::from_secs(59));
    assert!(registry.sweep(registry.clock().now()).evicted.is_empty());

    registry.clock().advance(Duration::from_secs(1));
    let stats = registry.sweep(registry.clock().now());
    assert_eq!(stats.evicted, vec![done.clone()]);
    assert_eq!(registry.snapshot(&done), BuildStatusResponse::empty());
    assert!(registry.get(&live).is_some());
}

#[test]
fn eviction_frees_capacity() {
    let registry = registry(config().max_jobs(1));
    let id = registry.create_job().unwrap();
    registry.cancel(&id, None).unwrap();
    assert!(registry.create_job().is_err());

    registry.clock().advance(Duration::from_secs(60));
    registry.sweep(registry.clock().now());
    assert!(registry.create_job().is_ok());
}
