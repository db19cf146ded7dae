// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use kiln_core::{BuildId, BuildJob, BuildTarget, JobPhase, SlavePhase, SlaveReport, WorkerId};
use serde_json::json;

#[test]
fn requests_are_tagged_by_type() {
    let request = Request::Status { id: BuildId::from_string("bld-1") };
    assert_eq!(serde_json::to_value(&request).unwrap(), json!({"type": "Status", "id": "bld-1"}));
}

#[test]
fn distribute_carries_plan_units() {
    let request = Request::Distribute {
        id: BuildId::from_string("bld-1"),
        units: vec![PlanUnit::new(BuildTarget::new("//a", "b"), "fp1")],
        workers: vec![WorkerId::new("w1")],
    };
    assert_eq!(
        serde_json::to_value(&request).unwrap(),
        json!({
            "type": "Distribute",
            "id": "bld-1",
            "units": [{"target": "//a:b", "fingerprint": "fp1"}],
            "workers": ["w1"],
        })
    );
}

#[test]
fn report_request_parses_from_worker_json() {
    let json = r#"{
        "type": "Report",
        "id": "bld-1",
        "worker": "w1",
        "report": {"timestamp": 3, "phase": "finished_success", "completed": ["//a:b"]}
    }"#;
    let request: Request = serde_json::from_str(json).unwrap();
    assert_eq!(
        request,
        Request::Report {
            id: BuildId::from_string("bld-1"),
            worker: WorkerId::new("w1"),
            report: SlaveReport::new(3, SlavePhase::FinishedSuccess)
                .completed([BuildTarget::new("//a", "b")]),
        }
    );
}

#[test]
fn cancel_reason_is_optional() {
    let request: Request = serde_json::from_str(r#"{"type":"Cancel","id":"bld-1"}"#).unwrap();
    assert_eq!(request, Request::Cancel { id: BuildId::from_string("bld-1"), reason: None });
}

#[test]
fn unknown_request_type_fails() {
    assert!(serde_json::from_str::<Request>(r#"{"type":"Explode"}"#).is_err());
}

#[test]
fn status_response_wraps_envelope() {
    let response = Response::Status(BuildStatusResponse::empty());
    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json, json!({"type": "Status"}));
    assert_eq!(serde_json::from_value::<Response>(json).unwrap(), response);
}

#[test]
fn job_summary_counts_workers() {
    let mut job = BuildJob::new(BuildId::from_string("bld-1"), 5);
    job.phase = JobPhase::Building;
    for name in ["w1", "w2"] {
        let worker = WorkerId::new(name);
        job.slaves.insert(
            worker.clone(),
            kiln_core::BuildSlaveStatus::new(worker, Default::default(), 5),
        );
    }
    let summary = JobSummary::from(&job);
    assert_eq!(summary.workers, 2);
    assert_eq!(summary.phase, JobPhase::Building);
    assert_eq!(summary.finished_at_ms, None);
}
