// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Adapters for external collaborators of the coordinator.

pub mod cache;

#[cfg(any(test, feature = "test-support"))]
pub use cache::{CacheCall, FakeArtifactCache};
pub use cache::{
    ArtifactCache, CacheError, CacheResult, DirArtifactCache, Fingerprint, NoopArtifactCache,
};
