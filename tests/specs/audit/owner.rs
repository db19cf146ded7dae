// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `kiln audit owner` specs

use crate::prelude::*;

const GRAPH: &str = r#"
[[target]]
name = "//base:name"
inputs = [
    "com/test/subtest/random.java",
    "com/test/subtest/other.java",
]

[[target]]
name = "//base:shared"
inputs = ["com/test/subtest/other.java"]
"#;

fn project() -> Project {
    let project = Project::empty();
    project.file("graph.toml", GRAPH);
    project.file("com/test/subtest/random.java", "class Random {}");
    project.file("com/test/subtest/other.java", "class Other {}");
    project.file("com/test/subtest/unowned.java", "class Unowned {}");
    project.file("com/test/subtest/BUCK", "");
    project
}

#[test]
fn json_output_is_flat_owner_map() {
    let project = project();
    project
        .kiln()
        .args(&[
            "audit",
            "owner",
            "--graph",
            "graph.toml",
            "--json",
            "com/test/subtest/random.java",
            "com/test/subtest/other.java",
        ])
        .passes()
        .stdout_eq(
            "{\"com/test/subtest/other.java\":[\"//base:name\",\"//base:shared\"],\
             \"com/test/subtest/random.java\":[\"//base:name\"]}\n",
        );
}

#[test]
fn text_output_lists_every_bucket() {
    let project = project();
    project.dir("com/test/empty");
    project
        .kiln()
        .args(&[
            "audit",
            "owner",
            "--graph",
            "graph.toml",
            "com/test/subtest/random.java",
            "com/test/subtest/unowned.java",
            "com/test/empty",
            "com/test/subtest/deleted.java",
        ])
        .passes()
        .stdout_has("//base:name")
        .stdout_has("Files without owners")
        .stdout_has("com/test/subtest/unowned.java")
        .stdout_has("Non-file inputs")
        .stdout_has("com/test/empty")
        .stdout_has("Non-existent files")
        .stdout_has("com/test/subtest/deleted.java");
}

#[test]
fn full_json_includes_guessed_build_file() {
    let project = project();
    let result = project
        .kiln()
        .args(&[
            "audit",
            "owner",
            "--graph",
            "graph.toml",
            "--json",
            "--full",
            "--guess-for-deleted",
            "com/test/subtest/deleted.java",
        ])
        .passes();
    let json: serde_json::Value = serde_json::from_str(&result.stdout()).unwrap();
    assert_eq!(json["non_existent_inputs"], serde_json::json!(["com/test/subtest/deleted.java"]));
    let guessed = json["guessed_build_files"]["com/test/subtest/deleted.java"].as_str().unwrap();
    assert!(guessed.ends_with("com/test/subtest/BUCK"), "{}", guessed);
}

#[test]
fn no_owners_found() {
    let project = project();
    project
        .kiln()
        .args(&["audit", "owner", "--graph", "graph.toml", "--json", "com/test/subtest/unowned.java"])
        .passes()
        .stdout_eq("{}\n");
}

#[test]
fn blank_path_is_usage_error() {
    let project = project();
    project
        .kiln()
        .args(&["audit", "owner", "--graph", "graph.toml", "a.java", ""])
        .fails()
        .exits_with(2)
        .stderr_has("blank");
}

#[test]
fn missing_paths_is_usage_error() {
    let project = project();
    project.kiln().args(&["audit", "owner", "--graph", "graph.toml"]).fails().exits_with(2);
}

#[test]
fn bad_graph_reports_file() {
    let project = project();
    project.file("broken.toml", "[[target]]\nname = \"no-slashes\"\ninputs = []\n");
    project
        .kiln()
        .args(&["audit", "owner", "--graph", "broken.toml", "a.java"])
        .fails()
        .exits_with(1)
        .stderr_has("broken.toml");
}

#[test]
fn global_output_flag_selects_json() {
    let project = project();
    project
        .kiln()
        .args(&["-o", "json", "audit", "owner", "--graph", "graph.toml", "com/test/subtest/random.java"])
        .passes()
        .stdout_eq("{\"com/test/subtest/random.java\":[\"//base:name\"]}\n");
}

#[test]
fn full_without_json_is_usage_error() {
    let project = project();
    project
        .kiln()
        .args(&["audit", "owner", "--graph", "graph.toml", "--full", "com/test/subtest/random.java"])
        .fails()
        .exits_with(2)
        .stderr_has("--full needs JSON output");
}
