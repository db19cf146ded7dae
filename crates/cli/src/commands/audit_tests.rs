// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::exit_error::{ExitError, EXIT_NOT_FOUND, EXIT_USAGE};
use tempfile::TempDir;

const GRAPH: &str = r#"
[[target]]
name = "//base:name"
inputs = ["com/test/subtest/random.java", "com/test/subtest/BUCK"]

[[target]]
name = "//base:other"
inputs = ["com/test/subtest/random.java"]
"#;

fn repo() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let sub = dir.path().join("com/test/subtest");
    std::fs::create_dir_all(&sub).unwrap();
    std::fs::write(sub.join("random.java"), "class Random {}").unwrap();
    std::fs::write(sub.join("BUCK"), "").unwrap();
    std::fs::write(dir.path().join("graph.toml"), GRAPH).unwrap();
    dir
}

fn owner_args(dir: &TempDir, paths: &[&str]) -> OwnerArgs {
    OwnerArgs {
        graph: dir.path().join("graph.toml"),
        root: dir.path().to_path_buf(),
        json: false,
        full: false,
        guess_for_deleted: false,
        build_file: None,
        paths: paths.iter().map(|p| p.to_string()).collect(),
    }
}

fn exit_code_of(err: anyhow::Error) -> i32 {
    err.downcast::<ExitError>().unwrap().code
}

#[test]
fn owner_json_lists_every_owner() {
    let dir = repo();
    let mut args = owner_args(&dir, &["com/test/subtest/random.java"]);
    args.json = true;
    similar_asserts::assert_eq!(
        owner(&args, OutputFormat::Text).unwrap(),
        "{\"com/test/subtest/random.java\":[\"//base:name\",\"//base:other\"]}\n"
    );
}

#[test]
fn global_json_output_applies_to_owner() {
    let dir = repo();
    let mut args = owner_args(&dir, &["com/test/subtest/random.java"]);
    let flat = owner(&args, OutputFormat::Json).unwrap();
    assert!(flat.starts_with("{\"com/test/subtest/random.java\""), "{}", flat);

    args.full = true;
    let full = owner(&args, OutputFormat::Json).unwrap();
    let full: serde_json::Value = serde_json::from_str(&full).unwrap();
    assert!(full.get("inputs_with_no_owners").is_some());
}

#[test]
fn full_without_json_is_usage_error() {
    let dir = repo();
    let mut args = owner_args(&dir, &["com/test/subtest/random.java"]);
    args.full = true;
    assert_eq!(exit_code_of(owner(&args, OutputFormat::Text).unwrap_err()), EXIT_USAGE);
}

#[test]
fn owner_text_reports_missing_paths() {
    let dir = repo();
    let args = owner_args(&dir, &["com/test/subtest/random.java", "gone.java"]);
    let text = owner(&args, OutputFormat::Text).unwrap();
    assert!(text.contains("//base:name"));
    assert!(text.contains("Non-existent files"));
    assert!(text.contains("gone.java"));
}

#[test]
fn owner_without_paths_is_usage_error() {
    let dir = repo();
    let err = owner(&owner_args(&dir, &[]), OutputFormat::Text).unwrap_err();
    assert_eq!(exit_code_of(err), EXIT_USAGE);
}

#[test]
fn owner_with_blank_path_is_usage_error() {
    let dir = repo();
    let err = owner(&owner_args(&dir, &["a.java", "  "]), OutputFormat::Text).unwrap_err();
    assert_eq!(exit_code_of(err), EXIT_USAGE);
}

#[test]
fn owner_with_missing_graph_fails() {
    let dir = repo();
    let mut args = owner_args(&dir, &["a.java"]);
    args.graph = dir.path().join("nope.toml");
    let err = owner(&args, OutputFormat::Text).unwrap_err();
    assert!(err.downcast_ref::<ExitError>().is_none());
    assert!(format!("{:#}", err).contains("nope.toml"));
}

#[test]
fn buildfile_is_relative_to_root() {
    let dir = repo();
    let args = BuildfileArgs {
        root: dir.path().to_path_buf(),
        build_file: None,
        path: PathBuf::from("com/test/subtest/random.java"),
    };
    assert_eq!(buildfile(&args).unwrap(), PathBuf::from("com/test/subtest/BUCK"));
}

#[test]
fn buildfile_not_found() {
    let dir = repo();
    let args = BuildfileArgs {
        root: dir.path().to_path_buf(),
        build_file: Some("TARGETS".into()),
        path: PathBuf::from("com/test/subtest/random.java"),
    };
    assert_eq!(exit_code_of(buildfile(&args).unwrap_err()), EXIT_NOT_FOUND);
}
