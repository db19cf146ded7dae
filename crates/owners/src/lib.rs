// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! kiln-owners: which targets own a set of repository paths.
//!
//! Paths are classified through a [`ProjectFilesystem`], matched against a
//! [`kiln_core::TargetGraph`] and returned as an [`OwnersReport`].

pub mod build_file;
pub mod fs;
pub mod manifest;
pub mod path;
pub mod render;
pub mod report;
pub mod resolver;

pub use build_file::{find_enclosing_build_file, DEFAULT_BUILD_FILE};
#[cfg(any(test, feature = "test-support"))]
pub use fs::FakeFilesystem;
pub use fs::{DiskFilesystem, EntryKind, ProjectFilesystem};
pub use manifest::{load_graph, parse_graph, ManifestError, ManifestFormat};
pub use report::OwnersReport;
pub use resolver::{OwnersError, OwnersResolver, ResolverConfig, BUILD_FILE_ENV};
