// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `kiln audit buildfile` specs

use crate::prelude::*;

#[test]
fn finds_nearest_build_file() {
    let project = Project::empty();
    project.file("java/BUCK", "");
    project.file("java/com/foo/Foo.java", "");
    project
        .kiln()
        .args(&["audit", "buildfile", "java/com/foo/Foo.java"])
        .passes()
        .stdout_eq("java/BUCK\n");
}

#[test]
fn deleted_file_still_finds_build_file() {
    let project = Project::empty();
    project.file("java/com/BUCK", "");
    project.dir("java/com/foo");
    project
        .kiln()
        .args(&["audit", "buildfile", "java/com/foo/Gone.java"])
        .passes()
        .stdout_eq("java/com/BUCK\n");
}

#[test]
fn build_file_name_from_env() {
    let project = Project::empty();
    project.file("lib/TARGETS", "");
    project.file("lib/BUCK", "");
    project
        .kiln()
        .env("KILN_BUILD_FILE", "TARGETS")
        .args(&["audit", "buildfile", "lib/a.rs"])
        .passes()
        .stdout_eq("lib/TARGETS\n");
}

#[test]
fn no_build_file_exits_not_found() {
    let project = Project::empty();
    project.file("src/main.rs", "");
    project
        .kiln()
        .args(&["audit", "buildfile", "src/main.rs"])
        .fails()
        .exits_with(1)
        .stderr_has("no build file found");
}
