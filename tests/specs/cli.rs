// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI help output specs

use crate::prelude::*;

#[test]
fn kiln_help_shows_usage() {
    cli().args(&["--help"]).passes().stdout_has("Usage:");
}

#[test]
fn kiln_no_args_fails_with_usage() {
    cli().fails().exits_with(2).stderr_has("Usage:");
}

#[test]
fn audit_help_shows_subcommands() {
    cli().args(&["audit", "--help"]).passes().stdout_has("owner").stdout_has("buildfile");
}

#[test]
fn job_help_shows_subcommands() {
    cli()
        .args(&["job", "--help"])
        .passes()
        .stdout_has("create")
        .stdout_has("status")
        .stdout_has("cancel")
        .stdout_has("list");
}

#[test]
fn kiln_version_shows_version() {
    cli().args(&["--version"]).passes().stdout_has(env!("CARGO_PKG_VERSION"));
}
