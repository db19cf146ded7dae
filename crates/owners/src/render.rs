// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Render an [`OwnersReport`] for people and tools.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write;
use std::path::PathBuf;

use serde::Serialize;

use crate::report::OwnersReport;

/// Owned path → fully-qualified owner ids, keys sorted.
pub fn owners_map(report: &OwnersReport) -> BTreeMap<String, Vec<String>> {
    report
        .owners_by_path()
        .into_iter()
        .map(|(path, targets)| {
            (path.display().to_string(), targets.iter().map(|t| t.to_string()).collect())
        })
        .collect()
}

/// Compact flat JSON object of owned paths, e.g. `{"a/b.java":["//a:b"]}`.
pub fn owners_json(report: &OwnersReport) -> Result<String, serde_json::Error> {
    serde_json::to_string(&owners_map(report))
}

#[derive(Serialize)]
struct FullReport<'a> {
    owners: BTreeMap<String, Vec<String>>,
    inputs_with_no_owners: Vec<String>,
    non_existent_inputs: &'a BTreeSet<String>,
    non_file_inputs: &'a BTreeSet<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    guessed_build_files: &'a BTreeMap<String, PathBuf>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    stat_errors: &'a BTreeMap<String, String>,
}

/// Every bucket plus the side notes, pretty-printed.
pub fn full_json(report: &OwnersReport) -> Result<String, serde_json::Error> {
    let full = FullReport {
        owners: owners_map(report),
        inputs_with_no_owners: report
            .inputs_with_no_owners
            .iter()
            .map(|p| p.display().to_string())
            .collect(),
        non_existent_inputs: &report.non_existent_inputs,
        non_file_inputs: &report.non_file_inputs,
        guessed_build_files: &report.guessed_build_files,
        stat_errors: &report.stat_errors,
    };
    serde_json::to_string_pretty(&full)
}

/// Human-readable report. Empty sections are omitted.
pub fn text(report: &OwnersReport) -> String {
    let mut out = String::new();

    if !report.owners.is_empty() {
        let width = report
            .owners
            .keys()
            .map(|node| node.build_target().to_string().len())
            .max()
            .unwrap_or(0);
        let _ = writeln!(out, "{:<width$}  Files", "Owner", width = width);
        for (node, paths) in &report.owners {
            let owner = node.build_target().to_string();
            for (i, path) in paths.iter().enumerate() {
                let label = if i == 0 { owner.as_str() } else { "" };
                let _ = writeln!(out, "{:<width$}  {}", label, path.display(), width = width);
            }
        }
    }

    section(&mut out, "Files without owners", report.inputs_with_no_owners.iter().map(|p| p.display().to_string()));
    section(&mut out, "Non-existent files", report.non_existent_inputs.iter().cloned());
    section(&mut out, "Non-file inputs", report.non_file_inputs.iter().cloned());
    section(
        &mut out,
        "Likely build files for deleted inputs",
        report
            .guessed_build_files
            .iter()
            .map(|(raw, build_file)| format!("{} -> {}", raw, build_file.display())),
    );
    section(
        &mut out,
        "Probe errors",
        report.stat_errors.iter().map(|(raw, error)| format!("{}: {}", raw, error)),
    );

    if out.is_empty() {
        out.push_str("No owners found\n");
    }
    out
}

fn section(out: &mut String, title: &str, lines: impl Iterator<Item = String>) {
    let mut lines = lines.peekable();
    if lines.peek().is_none() {
        return;
    }
    if !out.is_empty() {
        out.push('\n');
    }
    let _ = writeln!(out, "{}:", title);
    for line in lines {
        let _ = writeln!(out, "  {}", line);
    }
}

#[cfg(test)]
#[path = "render_tests.rs"]
mod tests;
