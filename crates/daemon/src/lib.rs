// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! kiln daemon library
//!
//! Owns the job registry for one user and serves the wire protocol over a
//! Unix socket.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod env;
pub mod lifecycle;
pub mod listener;

pub use lifecycle::{startup, Config, DaemonState, LifecycleError, StartupResult};
pub use listener::{handle_connection, handle_request, ConnectionError, ListenCtx, Listener};
