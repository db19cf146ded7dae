// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Target graph manifests.
//!
//! A manifest lists targets and the inputs each declares:
//!
//! ```toml
//! [[target]]
//! name = "//java/foo:lib"
//! inputs = ["java/foo/A.java", "java/foo/B.java"]
//! ```
//!
//! Files ending in `.json` are read as the same shape in JSON. Inputs are
//! repository-relative and normalized the same way query paths are.

use std::path::{Path, PathBuf};

use crate::path::normalize;
use kiln_core::{BuildTarget, GraphError, TargetGraph, TargetNode, TargetParseError};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid TOML manifest: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid JSON manifest: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Target(#[from] TargetParseError),
    #[error(transparent)]
    Graph(#[from] GraphError),
}

#[derive(Debug, Deserialize)]
struct Manifest {
    #[serde(default, rename = "target")]
    targets: Vec<TargetEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TargetEntry {
    name: String,
    #[serde(default)]
    inputs: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestFormat {
    Toml,
    Json,
}

impl ManifestFormat {
    /// `.json` files are JSON, everything else TOML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => ManifestFormat::Json,
            _ => ManifestFormat::Toml,
        }
    }
}

/// Read a manifest file into a [`TargetGraph`].
pub fn load_graph(path: &Path) -> Result<TargetGraph, ManifestError> {
    let content = std::fs::read_to_string(path)
        .map_err(|source| ManifestError::Io { path: path.to_path_buf(), source })?;
    let graph = parse_graph(&content, ManifestFormat::from_path(path))?;
    tracing::debug!(path = %path.display(), targets = graph.len(), "loaded target graph");
    Ok(graph)
}

pub fn parse_graph(content: &str, format: ManifestFormat) -> Result<TargetGraph, ManifestError> {
    let manifest: Manifest = match format {
        ManifestFormat::Toml => toml::from_str(content)?,
        ManifestFormat::Json => serde_json::from_str(content)?,
    };
    let nodes = manifest
        .targets
        .into_iter()
        .map(|entry| -> Result<TargetNode, ManifestError> {
            let target: BuildTarget = entry.name.parse()?;
            let inputs = entry.inputs.iter().map(|input| normalize(input, Path::new("")));
            Ok(TargetNode::new(target, inputs))
        })
        .collect::<Result<Vec<_>, ManifestError>>()?;
    Ok(TargetGraph::new(nodes)?)
}

#[cfg(test)]
#[path = "manifest_tests.rs"]
mod tests;
