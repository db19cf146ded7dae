// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! kilnd: the kiln build coordinator daemon.

use std::sync::Arc;

use kiln_adapters::DirArtifactCache;
use kiln_core::SystemClock;
use kiln_daemon::{startup, Config, LifecycleError, ListenCtx, Listener, StartupResult};
use kiln_engine::{spawn_sweeper, CoordinatorConfig, JobRegistry};
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), LifecycleError> {
    let config = Config::load()?;
    std::fs::create_dir_all(&config.state_dir)?;
    let _log_guard = setup_logging(&config);

    let coordinator_config = CoordinatorConfig::from_env();
    info!(?coordinator_config, "starting kilnd");
    let registry = Arc::new(JobRegistry::new(SystemClock, coordinator_config.clone()));

    let StartupResult { mut daemon, listener } = match startup(&config, Arc::clone(&registry)) {
        Ok(result) => result,
        Err(e) => {
            tracing::error!("startup failed: {}", e);
            return Err(e);
        }
    };

    let token = CancellationToken::new();
    let shutdown = Arc::new(Notify::new());
    let sweeper =
        spawn_sweeper(Arc::clone(&registry), coordinator_config.sweep_interval, token.clone());

    let ctx = Arc::new(ListenCtx::new(
        registry,
        DirArtifactCache::new(&config.cache_path),
        Arc::clone(&shutdown),
    ));
    let listener = tokio::spawn(Listener::new(listener, ctx).run(token.clone()));

    // Clients wait for this line before connecting
    println!("READY");

    let mut sigterm = signal(SignalKind::terminate())?;
    tokio::select! {
        _ = shutdown.notified() => info!("shutdown requested"),
        _ = tokio::signal::ctrl_c() => info!("received SIGINT"),
        _ = sigterm.recv() => info!("received SIGTERM"),
    }

    token.cancel();
    let _ = sweeper.await;
    let _ = listener.await;
    daemon.shutdown();
    Ok(())
}

/// Log to the configured log file, filtered by `RUST_LOG` (default `info`).
fn setup_logging(config: &Config) -> WorkerGuard {
    let dir = config.log_path.parent().unwrap_or(&config.state_dir);
    let file_name = config.log_path.file_name().unwrap_or_else(|| "kilnd.log".as_ref());
    let file_appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(file_appender);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(writer).with_ansi(false).init();
    guard
}
