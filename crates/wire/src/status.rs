// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The status envelope returned for a build job query.

use kiln_core::{BuildJob, ValidationError};
use serde::{Deserialize, Serialize};

/// Answer to a status query: the job's state, or nothing when the job is
/// unknown.
///
/// Fields added later are optional, so older readers ignore them and newer
/// readers default them. A missing `buildJob` decodes as `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BuildStatusResponse {
    #[serde(rename = "buildJob", default, skip_serializing_if = "Option::is_none")]
    pub build_job: Option<BuildJob>,
}

impl BuildStatusResponse {
    pub fn new(build_job: Option<BuildJob>) -> Self {
        Self { build_job }
    }

    pub fn of(job: BuildJob) -> Self {
        Self { build_job: Some(job) }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_set(&self) -> bool {
        self.build_job.is_some()
    }

    /// An empty envelope is valid; a present job must be internally consistent.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match &self.build_job {
            Some(job) => job.validate(),
            None => Ok(()),
        }
    }
}

impl From<BuildJob> for BuildStatusResponse {
    fn from(job: BuildJob) -> Self {
        Self::of(job)
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
