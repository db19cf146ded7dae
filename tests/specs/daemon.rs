// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle and job specs

use crate::prelude::*;

#[test]
fn job_commands_without_daemon_are_unavailable() {
    let project = Project::empty();
    project.kiln().args(&["job", "list"]).fails().exits_with(3).stderr_has("not running");
}

#[test]
fn daemon_status_when_stopped() {
    let project = Project::empty();
    project.kiln().args(&["daemon", "status"]).passes().stdout_has("Daemon not running");
}

#[test]
fn job_lifecycle_through_daemon() {
    let project = Project::empty();
    project.kiln().args(&["daemon", "start"]).passes().stdout_has("Daemon started");
    assert!(project.state_path().join("kilnd.pid").exists());

    let id = project.kiln().args(&["job", "create"]).passes().stdout().trim().to_string();
    assert!(id.starts_with("bld-"), "{}", id);

    project
        .kiln()
        .args(&["job", "status", &id])
        .passes()
        .stdout_has(&format!("Job: {}", id))
        .stdout_has("Phase: created");

    project.kiln().args(&["job", "list"]).passes().stdout_has(&id);

    project.kiln().args(&["job", "cancel", &id, "--reason", "spec"]).passes();
    let status = project.kiln().args(&["-o", "json", "job", "status", &id]).passes().stdout();
    let json: serde_json::Value = serde_json::from_str(&status).unwrap();
    assert_eq!(json["buildJob"]["phase"], "cancelled");
    assert_eq!(json["buildJob"]["result"]["reason"], "spec");

    // A second cancel leaves the job as it was
    project.kiln().args(&["job", "cancel", &id]).fails().exits_with(1);

    project.kiln().args(&["daemon", "stop"]).passes().stdout_has("Daemon stopped");
    let stopped = wait_for(SPEC_WAIT_MAX_MS, || !project.state_path().join("kilnd.sock").exists());
    assert!(stopped, "socket should be removed on shutdown");
}

#[test]
fn unknown_job_status_is_not_found() {
    let project = Project::empty();
    project.kiln().args(&["daemon", "start"]).passes();
    project.kiln().args(&["job", "status", "bld-missing"]).fails().exits_with(1);
    project.kiln().args(&["daemon", "status"]).passes().stdout_has("Status: running");
}
