// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Coordinator tuning, read from the environment.

use std::time::Duration;

pub const PROGRESS_TIMEOUT_ENV: &str = "KILN_PROGRESS_TIMEOUT_MS";
pub const RETENTION_ENV: &str = "KILN_RETENTION_MS";
pub const SWEEP_INTERVAL_ENV: &str = "KILN_SWEEP_INTERVAL_MS";
pub const MAX_JOBS_ENV: &str = "KILN_MAX_JOBS";

/// Timeouts and limits shared by every job in a registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinatorConfig {
    /// Idle window after which a distributing or building job fails
    pub progress_timeout: Duration,
    /// How long finished jobs stay queryable
    pub retention: Duration,
    /// Period of the background sweep
    pub sweep_interval: Duration,
    /// Most jobs held at once, finished ones included
    pub max_jobs: usize,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            progress_timeout: Duration::from_secs(600),
            retention: Duration::from_secs(3600),
            sweep_interval: Duration::from_secs(1),
            max_jobs: 1024,
        }
    }
}

impl CoordinatorConfig {
    /// Defaults overridden by `KILN_*` variables. Unparseable or zero values
    /// keep the default.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            progress_timeout: env_ms(PROGRESS_TIMEOUT_ENV).unwrap_or(defaults.progress_timeout),
            retention: env_ms(RETENTION_ENV).unwrap_or(defaults.retention),
            sweep_interval: env_ms(SWEEP_INTERVAL_ENV).unwrap_or(defaults.sweep_interval),
            max_jobs: env_positive(MAX_JOBS_ENV)
                .and_then(|n| usize::try_from(n).ok())
                .unwrap_or(defaults.max_jobs),
        }
    }

    kiln_core::setters! {
        progress_timeout: Duration,
        retention: Duration,
        sweep_interval: Duration,
        max_jobs: usize,
    }
}

fn env_positive(name: &str) -> Option<u64> {
    std::env::var(name).ok().and_then(|s| s.trim().parse::<u64>().ok()).filter(|n| *n > 0)
}

fn env_ms(name: &str) -> Option<Duration> {
    env_positive(name).map(Duration::from_millis)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
