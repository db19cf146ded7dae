// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle management: startup and shutdown.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use fs2::FileExt;
use kiln_core::Clock;
use kiln_engine::JobRegistry;
use thiserror::Error;
use tokio::net::UnixListener;
use tracing::{info, warn};

/// Daemon configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Root state directory (e.g. ~/.local/state/kiln)
    pub state_dir: PathBuf,
    /// Path to Unix socket
    pub socket_path: PathBuf,
    /// Path to lock/PID file
    pub lock_path: PathBuf,
    /// Path to daemon log file
    pub log_path: PathBuf,
    /// Directory backing the artifact cache
    pub cache_path: PathBuf,
}

impl Config {
    /// Load configuration for the user-level daemon.
    pub fn load() -> Result<Self, LifecycleError> {
        Ok(Self::in_dir(crate::env::state_dir()?))
    }

    /// Lay out every daemon file under `state_dir`.
    pub fn in_dir(state_dir: impl Into<PathBuf>) -> Self {
        let state_dir = state_dir.into();
        Self {
            socket_path: state_dir.join("kilnd.sock"),
            lock_path: state_dir.join("kilnd.pid"),
            log_path: state_dir.join("kilnd.log"),
            cache_path: state_dir.join("cache"),
            state_dir,
        }
    }
}

/// Daemon state during operation.
pub struct DaemonState<C: Clock> {
    pub config: Config,
    // Held for the exclusive lock; released on drop
    #[allow(dead_code)]
    lock_file: File,
    pub registry: Arc<JobRegistry<C>>,
    pub start_time: Instant,
}

/// Result of daemon startup: the daemon state plus the bound socket.
pub struct StartupResult<C: Clock> {
    pub daemon: DaemonState<C>,
    pub listener: UnixListener,
}

/// Lifecycle errors
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Could not determine state directory")]
    NoStateDir,

    #[error("Failed to acquire lock: daemon already running?")]
    LockFailed(#[source] std::io::Error),

    #[error("Failed to bind socket at {0}: {1}")]
    BindFailed(PathBuf, std::io::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Start the daemon
pub fn startup<C: Clock>(
    config: &Config,
    registry: Arc<JobRegistry<C>>,
) -> Result<StartupResult<C>, LifecycleError> {
    match startup_inner(config, registry) {
        Ok(result) => Ok(result),
        Err(e) => {
            // The files belong to the running daemon when the lock is held
            if !matches!(e, LifecycleError::LockFailed(_)) {
                cleanup_on_failure(config);
            }
            Err(e)
        }
    }
}

fn startup_inner<C: Clock>(
    config: &Config,
    registry: Arc<JobRegistry<C>>,
) -> Result<StartupResult<C>, LifecycleError> {
    std::fs::create_dir_all(&config.state_dir)?;

    // Lock before touching anything else; open without truncating so a
    // running daemon's PID survives a failed attempt.
    let mut lock_file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(&config.lock_path)?;
    lock_file.try_lock_exclusive().map_err(LifecycleError::LockFailed)?;
    lock_file.set_len(0)?;
    writeln!(lock_file, "{}", std::process::id())?;

    std::fs::create_dir_all(&config.cache_path)?;

    if config.socket_path.exists() {
        std::fs::remove_file(&config.socket_path)?;
    }
    let listener = UnixListener::bind(&config.socket_path)
        .map_err(|e| LifecycleError::BindFailed(config.socket_path.clone(), e))?;

    info!(socket = %config.socket_path.display(), "daemon started");

    Ok(StartupResult {
        daemon: DaemonState {
            config: config.clone(),
            lock_file,
            registry,
            start_time: Instant::now(),
        },
        listener,
    })
}

fn cleanup_on_failure(config: &Config) {
    remove_if_exists(&config.socket_path);
    remove_if_exists(&config.lock_path);
}

fn remove_if_exists(path: &Path) {
    if path.exists() {
        if let Err(e) = std::fs::remove_file(path) {
            warn!(path = %path.display(), "failed to remove file: {}", e);
        }
    }
}

impl<C: Clock> DaemonState<C> {
    /// Remove the socket and PID file. The lock is released when `self` drops.
    pub fn shutdown(&mut self) {
        info!(jobs = self.registry.len(), "Shutting down daemon...");
        remove_if_exists(&self.config.socket_path);
        remove_if_exists(&self.config.lock_path);
        info!(uptime_secs = self.start_time.elapsed().as_secs(), "Daemon shutdown complete");
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
