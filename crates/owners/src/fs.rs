// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Filesystem accessor used for path classification.
//!
//! The resolver never touches `std::fs` directly; every existence and
//! directory check goes through a [`ProjectFilesystem`] so tests can describe
//! the repository without creating files.

use std::io;
use std::path::{Path, PathBuf};

/// What a path points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Missing,
    File,
    Directory,
    /// Sockets, devices, fifos
    Other,
}

/// Read-only view of the repository on disk.
pub trait ProjectFilesystem: Send + Sync {
    /// Repository root. Paths handed out by [`resolve`](Self::resolve) live under it.
    fn root(&self) -> &Path;

    /// Turn a repository-relative path into one the other methods accept.
    fn resolve(&self, path: &Path) -> PathBuf;

    fn exists(&self, path: &Path) -> bool;

    fn is_directory(&self, path: &Path) -> bool;

    /// Classify `path`, surfacing I/O failures that are not plain absence.
    fn stat(&self, path: &Path) -> io::Result<EntryKind> {
        if !self.exists(path) {
            Ok(EntryKind::Missing)
        } else if self.is_directory(path) {
            Ok(EntryKind::Directory)
        } else {
            Ok(EntryKind::File)
        }
    }
}

/// [`ProjectFilesystem`] backed by the real disk.
#[derive(Debug, Clone)]
pub struct DiskFilesystem {
    root: PathBuf,
}

impl DiskFilesystem {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ProjectFilesystem for DiskFilesystem {
    fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    fn exists(&self, path: &Path) -> bool {
        self.resolve(path).exists()
    }

    fn is_directory(&self, path: &Path) -> bool {
        self.resolve(path).is_dir()
    }

    fn stat(&self, path: &Path) -> io::Result<EntryKind> {
        match std::fs::metadata(self.resolve(path)) {
            Ok(meta) if meta.is_file() => Ok(EntryKind::File),
            Ok(meta) if meta.is_dir() => Ok(EntryKind::Directory),
            Ok(_) => Ok(EntryKind::Other),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(EntryKind::Missing),
            Err(e) => Err(e),
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::{EntryKind, ProjectFilesystem};
    use std::collections::{BTreeMap, BTreeSet};
    use std::io;
    use std::path::{Path, PathBuf};

    /// In-memory [`ProjectFilesystem`] for tests.
    ///
    /// Paths not registered explicitly are classified as `fallback`, which
    /// defaults to [`EntryKind::Missing`].
    #[derive(Debug, Clone)]
    pub struct FakeFilesystem {
        root: PathBuf,
        files: BTreeSet<PathBuf>,
        dirs: BTreeSet<PathBuf>,
        errors: BTreeMap<PathBuf, io::ErrorKind>,
        aliases: BTreeMap<PathBuf, PathBuf>,
        fallback: EntryKind,
    }

    impl FakeFilesystem {
        pub fn new(root: impl Into<PathBuf>) -> Self {
            let root = root.into();
            let mut dirs = BTreeSet::new();
            dirs.insert(root.clone());
            Self {
                root,
                files: BTreeSet::new(),
                dirs,
                errors: BTreeMap::new(),
                aliases: BTreeMap::new(),
                fallback: EntryKind::Missing,
            }
        }

        /// Every unregistered path is classified as `kind`.
        pub fn with_fallback(mut self, kind: EntryKind) -> Self {
            self.fallback = kind;
            self
        }

        /// Register a file; its ancestors become directories.
        pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
            let path = path.into();
            self.add_ancestors(&path);
            self.files.insert(path);
            self
        }

        pub fn with_files<P: Into<PathBuf>>(self, paths: impl IntoIterator<Item = P>) -> Self {
            paths.into_iter().fold(self, |fs, p| fs.with_file(p))
        }

        pub fn with_dir(mut self, path: impl Into<PathBuf>) -> Self {
            let path = path.into();
            self.add_ancestors(&path);
            self.dirs.insert(path);
            self
        }

        /// Probing `path` fails with `kind`.
        pub fn with_error(mut self, path: impl Into<PathBuf>, kind: io::ErrorKind) -> Self {
            self.errors.insert(path.into(), kind);
            self
        }

        /// `resolve(from)` returns `to`.
        pub fn with_alias(mut self, from: impl Into<PathBuf>, to: impl Into<PathBuf>) -> Self {
            self.aliases.insert(from.into(), to.into());
            self
        }

        fn add_ancestors(&mut self, path: &Path) {
            for ancestor in path.ancestors().skip(1) {
                if ancestor.as_os_str().is_empty() {
                    break;
                }
                self.dirs.insert(ancestor.to_path_buf());
            }
        }

        fn kind_of(&self, path: &Path) -> EntryKind {
            if self.files.contains(path) {
                EntryKind::File
            } else if self.dirs.contains(path) {
                EntryKind::Directory
            } else {
                self.fallback
            }
        }
    }

    impl ProjectFilesystem for FakeFilesystem {
        fn root(&self) -> &Path {
            &self.root
        }

        fn resolve(&self, path: &Path) -> PathBuf {
            self.aliases.get(path).cloned().unwrap_or_else(|| path.to_path_buf())
        }

        fn exists(&self, path: &Path) -> bool {
            self.kind_of(path) != EntryKind::Missing
        }

        fn is_directory(&self, path: &Path) -> bool {
            self.kind_of(path) == EntryKind::Directory
        }

        fn stat(&self, path: &Path) -> io::Result<EntryKind> {
            match self.errors.get(path) {
                Some(kind) => Err(io::Error::new(*kind, format!("stat failed: {}", path.display()))),
                None => Ok(self.kind_of(path)),
            }
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeFilesystem;

#[cfg(test)]
#[path = "fs_tests.rs"]
mod tests;
