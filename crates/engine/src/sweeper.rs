// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Background timeout and eviction sweep.

use std::sync::Arc;
use std::time::Duration;

use kiln_core::Clock;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::registry::JobRegistry;

/// Sweep `registry` every `interval` until `token` is cancelled.
pub fn spawn_sweeper<C: Clock>(
    registry: Arc<JobRegistry<C>>,
    interval: Duration,
    token: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                _ = ticker.tick() => {
                    let stats = registry.sweep(registry.clock().now());
                    if !stats.timed_out.is_empty() || !stats.evicted.is_empty() {
                        tracing::debug!(
                            timed_out = stats.timed_out.len(),
                            evicted = stats.evicted.len(),
                            "sweep"
                        );
                    }
                }
            }
        }
        tracing::debug!("sweeper stopped");
    })
}

#[cfg(test)]
#[path = "sweeper_tests.rs"]
mod tests;
