// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate.

use std::path::PathBuf;
use std::time::Duration;

use crate::lifecycle::LifecycleError;

pub const STATE_DIR_ENV: &str = "KILN_STATE_DIR";
pub const IPC_TIMEOUT_ENV: &str = "KILN_IPC_TIMEOUT_MS";

/// Resolve state directory: KILN_STATE_DIR > XDG_STATE_HOME/kiln > ~/.local/state/kiln
pub fn state_dir() -> Result<PathBuf, LifecycleError> {
    if let Ok(dir) = std::env::var(STATE_DIR_ENV) {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("kiln"));
    }
    let home = std::env::var("HOME").map_err(|_| LifecycleError::NoStateDir)?;
    Ok(PathBuf::from(home).join(".local/state/kiln"))
}

/// Default IPC timeout
pub fn ipc_timeout() -> Duration {
    std::env::var(IPC_TIMEOUT_ENV)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .filter(|&ms| ms > 0)
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_secs(5))
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
