// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resolve which targets own a set of repository paths.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use kiln_core::{TargetGraph, TargetNode};
use thiserror::Error;

use crate::build_file::{find_enclosing_build_file, DEFAULT_BUILD_FILE};
use crate::fs::{EntryKind, ProjectFilesystem};
use crate::path::normalize;
use crate::report::OwnersReport;

/// Environment variable overriding the build file name.
pub const BUILD_FILE_ENV: &str = "KILN_BUILD_FILE";

/// Errors from validating an ownership query.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OwnersError {
    #[error("no input paths given")]
    NoInputs,
    #[error("input #{index} is blank")]
    BlankInput { index: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    pub build_file_name: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self { build_file_name: DEFAULT_BUILD_FILE.to_string() }
    }
}

impl ResolverConfig {
    /// Defaults with `KILN_BUILD_FILE` applied when set and non-blank.
    pub fn from_env() -> Self {
        match std::env::var(BUILD_FILE_ENV) {
            Ok(name) if !name.trim().is_empty() => Self { build_file_name: name.trim().to_string() },
            _ => Self::default(),
        }
    }

    pub fn build_file_name(mut self, name: impl Into<String>) -> Self {
        self.build_file_name = name.into();
        self
    }
}

/// Query paths sorted by what the filesystem says they are.
///
/// Everything except the node lookup. `files` holds the normalized paths of
/// existing regular files; the base report already carries the other buckets
/// and lists every file as unowned until a node claims it.
#[derive(Debug, Clone, Default)]
pub struct Classification {
    pub files: BTreeSet<PathBuf>,
    pub base: OwnersReport,
}

/// Stateless ownership query over a [`ProjectFilesystem`].
pub struct OwnersResolver<'fs, F: ProjectFilesystem + ?Sized> {
    fs: &'fs F,
    config: ResolverConfig,
}

impl<'fs, F: ProjectFilesystem + ?Sized> OwnersResolver<'fs, F> {
    pub fn new(fs: &'fs F) -> Self {
        Self { fs, config: ResolverConfig::default() }
    }

    pub fn with_config(fs: &'fs F, config: ResolverConfig) -> Self {
        Self { fs, config }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Classify `inputs` and attribute every existing file to the nodes
    /// declaring it.
    ///
    /// With `guess_for_deleted`, missing inputs also get the nearest
    /// enclosing build file recorded in `guessed_build_files`.
    pub fn resolve<S: AsRef<str>>(
        &self,
        graph: &TargetGraph,
        inputs: &[S],
        guess_for_deleted: bool,
    ) -> Result<OwnersReport, OwnersError> {
        let classification = self.classify(inputs, guess_for_deleted)?;
        let report = graph
            .nodes()
            .map(|node| report_for_node(node, &classification.files))
            .fold(classification.base, OwnersReport::merge);

        tracing::debug!(
            inputs = inputs.len(),
            targets = graph.len(),
            owners = report.owners.len(),
            unowned = report.inputs_with_no_owners.len(),
            missing = report.non_existent_inputs.len(),
            non_files = report.non_file_inputs.len(),
            "resolved owners"
        );
        Ok(report)
    }

    /// Validate and classify the raw inputs. Duplicates collapse.
    pub fn classify<S: AsRef<str>>(
        &self,
        inputs: &[S],
        guess_for_deleted: bool,
    ) -> Result<Classification, OwnersError> {
        if inputs.is_empty() {
            return Err(OwnersError::NoInputs);
        }
        if let Some(index) = inputs.iter().position(|raw| raw.as_ref().trim().is_empty()) {
            return Err(OwnersError::BlankInput { index });
        }

        let raw_inputs: BTreeSet<&str> = inputs.iter().map(|raw| raw.as_ref()).collect();
        let mut out = Classification::default();
        for raw in raw_inputs {
            let resolved = self.fs.resolve(Path::new(raw));
            match self.fs.stat(&resolved) {
                Ok(EntryKind::File) => {
                    out.files.insert(normalize(raw, self.fs.root()));
                }
                Ok(EntryKind::Directory) | Ok(EntryKind::Other) => {
                    out.base.non_file_inputs.insert(raw.to_string());
                }
                Ok(EntryKind::Missing) => {
                    self.record_missing(&mut out.base, raw, guess_for_deleted);
                }
                Err(e) => {
                    tracing::warn!(input = raw, error = %e, "stat failed, treating input as missing");
                    out.base.stat_errors.insert(raw.to_string(), e.to_string());
                    self.record_missing(&mut out.base, raw, guess_for_deleted);
                }
            }
        }
        out.base.inputs_with_no_owners = out.files.clone();
        Ok(out)
    }

    /// Nearest build file governing `path`, using the configured file name.
    pub fn find_enclosing_build_file(&self, path: &Path) -> Option<PathBuf> {
        find_enclosing_build_file(self.fs, path, &self.config.build_file_name)
    }

    fn record_missing(&self, report: &mut OwnersReport, raw: &str, guess_for_deleted: bool) {
        report.non_existent_inputs.insert(raw.to_string());
        if guess_for_deleted {
            if let Some(build_file) = self.find_enclosing_build_file(Path::new(raw)) {
                report.guessed_build_files.insert(raw.to_string(), build_file);
            }
        }
    }
}

/// The part of a report contributed by one node: the files it declares.
pub fn report_for_node(node: &TargetNode, files: &BTreeSet<PathBuf>) -> OwnersReport {
    let declared: BTreeSet<PathBuf> = files.iter().filter(|p| node.declares(p)).cloned().collect();
    let mut owners = BTreeMap::new();
    if !declared.is_empty() {
        owners.insert(node.clone(), declared);
    }
    OwnersReport { owners, ..Default::default() }
}

#[cfg(test)]
#[path = "resolver_tests.rs"]
mod tests;
