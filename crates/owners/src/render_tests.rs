// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::fs::FakeFilesystem;
use crate::resolver::OwnersResolver;
use kiln_core::test_support::node;
use kiln_core::TargetGraph;

const INPUTS: [&str; 3] =
    ["java/somefolder/badfolder/somefile.java", "java/somefolder/perfect.java", "com/test/subtest/random.java"];

fn single_owner_report() -> OwnersReport {
    let fs = FakeFilesystem::new("repo").with_files(INPUTS);
    let graph = TargetGraph::new(vec![node("//base/name:name", &INPUTS)]).unwrap();
    OwnersResolver::new(&fs).resolve(&graph, &INPUTS, false).unwrap()
}

#[test]
fn owners_json_is_flat_sorted_and_compact() {
    let expected = concat!(
        "{",
        "\"com/test/subtest/random.java\":[\"//base/name:name\"],",
        "\"java/somefolder/badfolder/somefile.java\":[\"//base/name:name\"],",
        "\"java/somefolder/perfect.java\":[\"//base/name:name\"]",
        "}"
    );
    assert_eq!(owners_json(&single_owner_report()).unwrap(), expected);
}

#[test]
fn owners_json_lists_every_owner_in_target_order() {
    let fs = FakeFilesystem::new("repo").with_file("a/x.java");
    let graph =
        TargetGraph::new(vec![node("//b:two", &["a/x.java"]), node("//a:one", &["a/x.java"])]).unwrap();
    let report = OwnersResolver::new(&fs).resolve(&graph, &["a/x.java"], false).unwrap();
    assert_eq!(owners_json(&report).unwrap(), r#"{"a/x.java":["//a:one","//b:two"]}"#);
}

#[test]
fn owners_json_of_empty_report() {
    assert_eq!(owners_json(&OwnersReport::default()).unwrap(), "{}");
}

#[test]
fn full_json_carries_every_bucket() {
    let fs = FakeFilesystem::new("root").with_file("root/BUCK").with_file("root/a.java").with_dir("root/d");
    let report = OwnersResolver::new(&fs)
        .resolve(&TargetGraph::default(), &["root/a.java", "root/d", "root/gone.java"], true)
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&full_json(&report).unwrap()).unwrap();

    assert_eq!(value["inputs_with_no_owners"], serde_json::json!(["root/a.java"]));
    assert_eq!(value["non_file_inputs"], serde_json::json!(["root/d"]));
    assert_eq!(value["non_existent_inputs"], serde_json::json!(["root/gone.java"]));
    assert_eq!(value["guessed_build_files"]["root/gone.java"], "root/BUCK");
    assert!(value.get("stat_errors").is_none());
}

#[test]
fn text_lists_owner_then_sections() {
    let fs = FakeFilesystem::new("repo").with_files(["a/x.java", "a/y.java"]);
    let graph = TargetGraph::new(vec![node("//a:lib", &["a/x.java"])]).unwrap();
    let report =
        OwnersResolver::new(&fs).resolve(&graph, &["a/x.java", "a/y.java", "a/z.java"], false).unwrap();

    similar_asserts::assert_eq!(
        text(&report),
        "Owner    Files\n\
         //a:lib  a/x.java\n\
         \n\
         Files without owners:\n  a/y.java\n\
         \n\
         Non-existent files:\n  a/z.java\n"
    );
}

#[test]
fn text_of_empty_report() {
    assert_eq!(text(&OwnersReport::default()), "No owners found\n");
}
