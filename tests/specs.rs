// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workspace-level behavioral specs for the `kiln` CLI and `kilnd` daemon.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

#[path = "specs/prelude.rs"]
mod prelude;

#[path = "specs/audit/mod.rs"]
mod audit;
#[path = "specs/cli.rs"]
mod cli;
#[path = "specs/daemon.rs"]
mod daemon;
