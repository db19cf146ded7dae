// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Build targets and the read-only target graph.
//!
//! A [`BuildTarget`] names one buildable unit (`//java/foo:lib`). A
//! [`TargetNode`] pairs a target with the repository-relative paths it
//! declares as inputs. A [`TargetGraph`] is the immutable view both the
//! ownership resolver and the coordinator read from.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use thiserror::Error;

/// Prefix every fully-qualified base path starts with.
pub const CELL_ROOT: &str = "//";

/// Errors from parsing a fully-qualified target string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TargetParseError {
    #[error("target '{0}' must start with '//'")]
    MissingRoot(String),
    #[error("target '{0}' is missing ':<name>'")]
    MissingName(String),
    #[error("target '{0}' has an empty name")]
    EmptyName(String),
}

/// Identifier of one buildable unit: a base path plus a short name.
///
/// Serializes as its fully-qualified form (`"//base:name"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BuildTarget {
    base_path: String,
    short_name: String,
}

impl BuildTarget {
    /// Create a target. `base_path` is normalized to start with `//`.
    pub fn new(base_path: impl Into<String>, short_name: impl Into<String>) -> Self {
        let base_path = base_path.into();
        let base_path = if base_path.starts_with(CELL_ROOT) {
            base_path
        } else {
            format!("{}{}", CELL_ROOT, base_path.trim_start_matches('/'))
        };
        Self { base_path, short_name: short_name.into() }
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    pub fn short_name(&self) -> &str {
        &self.short_name
    }

    /// `//base:name`
    pub fn fully_qualified_name(&self) -> String {
        self.to_string()
    }

    /// Repository-relative directory of the target (`java/foo` for `//java/foo:lib`).
    pub fn base_dir(&self) -> &Path {
        Path::new(self.base_path.trim_start_matches(CELL_ROOT))
    }
}

impl fmt::Display for BuildTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.base_path, self.short_name)
    }
}

impl FromStr for BuildTarget {
    type Err = TargetParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !s.starts_with(CELL_ROOT) {
            return Err(TargetParseError::MissingRoot(s.to_string()));
        }
        let (base, name) =
            s.rsplit_once(':').ok_or_else(|| TargetParseError::MissingName(s.to_string()))?;
        if name.is_empty() {
            return Err(TargetParseError::EmptyName(s.to_string()));
        }
        Ok(Self { base_path: base.to_string(), short_name: name.to_string() })
    }
}

impl serde::Serialize for BuildTarget {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for BuildTarget {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A target plus its declared inputs.
///
/// Equality, ordering and hashing look at the target only, so a node can key
/// a map the same way its target would. Inputs are shared, making clones cheap.
#[derive(Debug, Clone)]
pub struct TargetNode {
    target: BuildTarget,
    inputs: Arc<BTreeSet<PathBuf>>,
}

impl TargetNode {
    pub fn new(target: BuildTarget, inputs: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        Self { target, inputs: Arc::new(inputs.into_iter().map(Into::into).collect()) }
    }

    pub fn build_target(&self) -> &BuildTarget {
        &self.target
    }

    pub fn inputs(&self) -> &BTreeSet<PathBuf> {
        &self.inputs
    }

    /// Whether `path` (already normalized) is one of this node's inputs.
    pub fn declares(&self, path: &Path) -> bool {
        self.inputs.contains(path)
    }
}

impl PartialEq for TargetNode {
    fn eq(&self, other: &Self) -> bool {
        self.target == other.target
    }
}

impl Eq for TargetNode {}

impl PartialOrd for TargetNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TargetNode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.target.cmp(&other.target)
    }
}

impl Hash for TargetNode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.target.hash(state);
    }
}

/// Errors from building a [`TargetGraph`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("target {0} is declared more than once")]
    DuplicateTarget(BuildTarget),
}

/// Read-only projection of the build graph: target → node.
#[derive(Debug, Clone, Default)]
pub struct TargetGraph {
    nodes: BTreeMap<BuildTarget, TargetNode>,
}

impl TargetGraph {
    pub fn new(nodes: impl IntoIterator<Item = TargetNode>) -> Result<Self, GraphError> {
        let mut map = BTreeMap::new();
        for node in nodes {
            let target = node.build_target().clone();
            if map.insert(target.clone(), node).is_some() {
                return Err(GraphError::DuplicateTarget(target));
            }
        }
        Ok(Self { nodes: map })
    }

    /// Nodes in target order.
    pub fn nodes(&self) -> impl Iterator<Item = &TargetNode> {
        self.nodes.values()
    }

    pub fn targets(&self) -> impl Iterator<Item = &BuildTarget> {
        self.nodes.keys()
    }

    pub fn get(&self, target: &BuildTarget) -> Option<&TargetNode> {
        self.nodes.get(target)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
#[path = "target_tests.rs"]
mod tests;
