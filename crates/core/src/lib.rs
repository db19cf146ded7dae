// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! kiln-core: shared model for the kiln build coordinator.
//!
//! Build targets and the target graph, per-worker status, and the
//! distributed build job state machine types.

pub mod macros;

pub mod clock;
pub mod id;
pub mod job;
pub mod slave;
pub mod target;
pub mod time_fmt;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use clock::{duration_ms, Clock, FakeClock, SystemClock};
#[cfg(any(test, feature = "test-support"))]
pub use job::BuildJobBuilder;
pub use job::{BuildId, BuildJob, FailureCause, JobPhase, JobResult, ValidationError};
#[cfg(any(test, feature = "test-support"))]
pub use slave::BuildSlaveStatusBuilder;
pub use slave::{BuildSlaveStatus, SlavePhase, SlaveReport, WorkerId};
pub use target::{BuildTarget, GraphError, TargetGraph, TargetNode, TargetParseError};
pub use time_fmt::{format_elapsed, format_elapsed_ms};
