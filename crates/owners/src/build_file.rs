// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Build file discovery

use std::path::{Path, PathBuf};

use crate::fs::ProjectFilesystem;

/// Default name of the file that declares targets in a directory.
pub const DEFAULT_BUILD_FILE: &str = "BUCK";

/// Find the nearest build file governing `path`.
///
/// The walk starts at `path` when it is a directory and at its parent
/// otherwise, checking `<dir>/<build_file_name>` at each level. It stops once
/// it leaves the repository root. Returns `None` when no ancestor inside the
/// root has a build file.
pub fn find_enclosing_build_file<F>(
    fs: &F,
    path: &Path,
    build_file_name: &str,
) -> Option<PathBuf>
where
    F: ProjectFilesystem + ?Sized,
{
    let resolved = fs.resolve(path);
    let root = fs.root();
    let start = if fs.is_directory(&resolved) { Some(resolved.as_path()) } else { resolved.parent() };

    let mut dir = start;
    while let Some(current) = dir {
        if !current.starts_with(root) {
            break;
        }
        let candidate = current.join(build_file_name);
        if fs.exists(&candidate) {
            tracing::debug!(path = %path.display(), build_file = %candidate.display(), "found build file");
            return Some(candidate);
        }
        dir = current.parent();
    }
    None
}

#[cfg(test)]
#[path = "build_file_tests.rs"]
mod tests;
