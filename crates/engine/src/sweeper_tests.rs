// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::config::CoordinatorConfig;
use kiln_core::test_support::{target, target_set};
use kiln_core::{FakeClock, JobPhase, WorkerId};

fn registry() -> Arc<JobRegistry<FakeClock>> {
    let config = CoordinatorConfig::default()
        .progress_timeout(Duration::from_secs(5))
        .retention(Duration::from_secs(30));
    Arc::new(JobRegistry::new(FakeClock::new(), config))
}

async fn wait_for(mut done: impl FnMut() -> bool) {
    for _ in 0..200 {
        if done() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not reached");
}

#[tokio::test]
async fn sweeper_times_out_and_evicts() {
    let registry = registry();
    let stalled = registry.create_job().unwrap();
    registry.assign(&stalled, WorkerId::new("w1"), target_set(&[target("//a", "b")])).unwrap();
    registry.clock().advance(Duration::from_secs(5));

    let token = CancellationToken::new();
    let handle = spawn_sweeper(Arc::clone(&registry), Duration::from_millis(5), token.clone());

    wait_for(|| registry.get(&stalled).is_some_and(|c| c.phase() == JobPhase::FinishedFailure)).await;

    registry.clock().advance(Duration::from_secs(30));
    wait_for(|| registry.get(&stalled).is_none()).await;

    token.cancel();
    handle.await.unwrap();
}

#[tokio::test]
async fn sweeper_stops_on_cancel() {
    let token = CancellationToken::new();
    let handle = spawn_sweeper(registry(), Duration::from_secs(3600), token.clone());
    token.cancel();
    tokio::time::timeout(Duration::from_secs(1), handle).await.unwrap().unwrap();
}
