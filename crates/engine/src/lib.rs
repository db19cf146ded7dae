// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! kiln-engine: distributed build job coordination.
//!
//! Worker reports flow through [`ingest`] into a [`JobCoordinator`], which
//! aggregates them into one job phase. A [`JobRegistry`] owns every job and
//! is swept in the background for timeouts and expired results.

pub mod aggregate;
pub mod config;
pub mod coordinator;
pub mod distribute;
pub mod ingest;
pub mod partition;
pub mod registry;
pub mod sweeper;

pub use aggregate::{aggregate_phase, PhaseCounts};
pub use config::CoordinatorConfig;
pub use coordinator::{CoordinatorError, JobCoordinator};
pub use distribute::{DistributeError, DistributionSummary, Distributor, WorkUnit};
pub use ingest::{apply_report, IngestError, SlaveTransition};
pub use partition::{partition, PartitionError};
pub use registry::{JobRegistry, RegistryError, SweepStats};
pub use sweeper::spawn_sweeper;
