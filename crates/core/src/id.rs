// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Build job identifier.

use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// Unique identifier for one distributed build: `bld-` plus 19 random
/// characters, short enough to stay inline in a `SmolStr`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuildId(SmolStr);

impl BuildId {
    pub const PREFIX: &'static str = "bld-";

    pub fn new() -> Self {
        Self(SmolStr::new(format!("{}{}", Self::PREFIX, nanoid::nanoid!(19))))
    }

    /// Wrap an id received from a client or the wire.
    pub fn from_string(id: impl Into<SmolStr>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for BuildId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BuildId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BuildId {
    fn from(id: &str) -> Self {
        Self::from_string(id)
    }
}

impl From<String> for BuildId {
    fn from(id: String) -> Self {
        Self::from_string(id)
    }
}

impl Borrow<str> for BuildId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl Deref for BuildId {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
