// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The result of one ownership query.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use kiln_core::{BuildTarget, TargetNode};

/// Classification of a set of query paths against a target graph.
///
/// The four buckets partition the queried strings: every raw input is
/// either owned (by one or more nodes), an existing file nobody owns,
/// missing, or not a file. `guessed_build_files` and `stat_errors` are
/// side notes about entries of `non_existent_inputs` and never hold a path
/// of their own.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OwnersReport {
    /// Node → the queried (normalized) paths it declares
    pub owners: BTreeMap<TargetNode, BTreeSet<PathBuf>>,
    /// Existing files declared by no node (normalized)
    pub inputs_with_no_owners: BTreeSet<PathBuf>,
    /// Raw inputs that do not exist (or could not be inspected)
    pub non_existent_inputs: BTreeSet<String>,
    /// Raw inputs that exist but are not regular files
    pub non_file_inputs: BTreeSet<String>,
    /// Raw missing input → nearest enclosing build file
    pub guessed_build_files: BTreeMap<String, PathBuf>,
    /// Raw input → I/O error seen while probing it
    pub stat_errors: BTreeMap<String, String>,
}

impl OwnersReport {
    /// True when no bucket holds anything.
    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
            && self.inputs_with_no_owners.is_empty()
            && self.non_existent_inputs.is_empty()
            && self.non_file_inputs.is_empty()
    }

    /// Combine two reports computed over (possibly overlapping) parts of a graph.
    ///
    /// Buckets and per-node path sets are unioned. A path one side could not
    /// attribute but the other side owns ends up owned only. Conflicting side
    /// notes keep the smaller value so the result does not depend on argument
    /// order.
    pub fn merge(mut self, other: OwnersReport) -> OwnersReport {
        for (node, paths) in other.owners {
            if paths.is_empty() {
                continue;
            }
            self.owners.entry(node).or_default().extend(paths);
        }
        self.inputs_with_no_owners.extend(other.inputs_with_no_owners);
        self.non_existent_inputs.extend(other.non_existent_inputs);
        self.non_file_inputs.extend(other.non_file_inputs);
        merge_min(&mut self.guessed_build_files, other.guessed_build_files);
        merge_min(&mut self.stat_errors, other.stat_errors);

        let owned: BTreeSet<&PathBuf> = self.owners.values().flatten().collect();
        let unowned: BTreeSet<PathBuf> = self
            .inputs_with_no_owners
            .iter()
            .filter(|p| !owned.contains(p))
            .cloned()
            .collect();
        self.inputs_with_no_owners = unowned;
        self
    }

    /// Targets owning `path`, in target order.
    pub fn owners_of(&self, path: &Path) -> Vec<&BuildTarget> {
        self.owners
            .iter()
            .filter(|(_, paths)| paths.contains(path))
            .map(|(node, _)| node.build_target())
            .collect()
    }

    /// Every path owned by at least one node.
    pub fn owned_paths(&self) -> BTreeSet<&PathBuf> {
        self.owners.values().flatten().collect()
    }

    /// Owned path → owning targets in target order.
    pub fn owners_by_path(&self) -> BTreeMap<&Path, Vec<&BuildTarget>> {
        let mut by_path: BTreeMap<&Path, Vec<&BuildTarget>> = BTreeMap::new();
        for (node, paths) in &self.owners {
            for path in paths {
                by_path.entry(path.as_path()).or_default().push(node.build_target());
            }
        }
        by_path
    }
}

fn merge_min<V: Ord>(into: &mut BTreeMap<String, V>, from: BTreeMap<String, V>) {
    for (key, value) in from {
        match into.get(&key) {
            Some(existing) if *existing <= value => {}
            _ => {
                into.insert(key, value);
            }
        }
    }
}

#[cfg(test)]
#[path = "report_tests.rs"]
mod tests;
