// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Artifact cache adapters.
//!
//! The distributor asks the cache whether a work unit's output already exists
//! before assigning it to a worker. Fingerprints are opaque keys computed by
//! the caller.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Content key of one cached artifact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(pub String);

impl Fingerprint {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Safe to use as a single path component.
    pub fn is_path_safe(&self) -> bool {
        !self.0.is_empty()
            && self.0 != "."
            && self.0 != ".."
            && self.0.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Fingerprint {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Outcome of a cache lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheResult {
    Hit(Vec<u8>),
    Miss,
}

impl CacheResult {
    pub fn is_hit(&self) -> bool {
        matches!(self, CacheResult::Hit(_))
    }
}

/// Errors from cache operations
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("fingerprint '{0}' cannot be used as a cache key")]
    InvalidFingerprint(Fingerprint),
    #[error("cache I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cache backend failed: {0}")]
    Backend(String),
}

/// Adapter for a content-addressed artifact store
#[async_trait]
pub trait ArtifactCache: Clone + Send + Sync + 'static {
    /// Look up the artifact stored under `fingerprint`
    async fn fetch(&self, fingerprint: &Fingerprint) -> Result<CacheResult, CacheError>;

    /// Store `artifact` under `fingerprint`, replacing any previous entry
    async fn store(&self, fingerprint: &Fingerprint, artifact: &[u8]) -> Result<(), CacheError>;
}

/// Cache that never holds anything: every fetch misses, every store succeeds.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopArtifactCache;

impl NoopArtifactCache {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ArtifactCache for NoopArtifactCache {
    async fn fetch(&self, _fingerprint: &Fingerprint) -> Result<CacheResult, CacheError> {
        Ok(CacheResult::Miss)
    }

    async fn store(&self, _fingerprint: &Fingerprint, _artifact: &[u8]) -> Result<(), CacheError> {
        Ok(())
    }
}

/// zstd level used for stored artifacts
const COMPRESSION_LEVEL: i32 = 3;

/// Directory-backed cache: one zstd-compressed file per fingerprint.
#[derive(Clone, Debug)]
pub struct DirArtifactCache {
    root: PathBuf,
}

impl DirArtifactCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entry_path(&self, fingerprint: &Fingerprint) -> Result<PathBuf, CacheError> {
        if !fingerprint.is_path_safe() {
            return Err(CacheError::InvalidFingerprint(fingerprint.clone()));
        }
        Ok(self.root.join(format!("{}.zst", fingerprint)))
    }
}

#[async_trait]
impl ArtifactCache for DirArtifactCache {
    async fn fetch(&self, fingerprint: &Fingerprint) -> Result<CacheResult, CacheError> {
        let path = self.entry_path(fingerprint)?;
        let compressed = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(%fingerprint, "cache miss");
                return Ok(CacheResult::Miss);
            }
            Err(source) => return Err(CacheError::Io { path, source }),
        };
        let artifact = zstd::decode_all(compressed.as_slice())
            .map_err(|source| CacheError::Io { path: path.clone(), source })?;
        tracing::debug!(%fingerprint, bytes = artifact.len(), "cache hit");
        Ok(CacheResult::Hit(artifact))
    }

    async fn store(&self, fingerprint: &Fingerprint, artifact: &[u8]) -> Result<(), CacheError> {
        let path = self.entry_path(fingerprint)?;
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|source| CacheError::Io { path: self.root.clone(), source })?;
        let compressed = zstd::encode_all(artifact, COMPRESSION_LEVEL)
            .map_err(|source| CacheError::Io { path: path.clone(), source })?;

        // Write then rename so readers never see a partial entry
        let tmp = path.with_extension("zst.tmp");
        tokio::fs::write(&tmp, &compressed)
            .await
            .map_err(|source| CacheError::Io { path: tmp.clone(), source })?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|source| CacheError::Io { path: path.clone(), source })?;
        tracing::debug!(%fingerprint, bytes = artifact.len(), "stored artifact");
        Ok(())
    }
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::{ArtifactCache, CacheError, CacheResult, Fingerprint};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::{BTreeMap, BTreeSet};
    use std::sync::Arc;

    /// Recorded cache call
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum CacheCall {
        Fetch(Fingerprint),
        Store(Fingerprint, usize),
    }

    #[derive(Default)]
    struct FakeCacheState {
        entries: BTreeMap<Fingerprint, Vec<u8>>,
        failing: BTreeSet<Fingerprint>,
        calls: Vec<CacheCall>,
    }

    /// In-memory cache that records every call
    #[derive(Clone, Default)]
    pub struct FakeArtifactCache {
        inner: Arc<Mutex<FakeCacheState>>,
    }

    impl FakeArtifactCache {
        pub fn new() -> Self {
            Self::default()
        }

        /// Pre-populate an entry so fetches hit.
        pub fn insert(&self, fingerprint: impl Into<Fingerprint>, artifact: &[u8]) {
            self.inner.lock().entries.insert(fingerprint.into(), artifact.to_vec());
        }

        /// Make every call for `fingerprint` fail with a backend error.
        pub fn fail_on(&self, fingerprint: impl Into<Fingerprint>) {
            self.inner.lock().failing.insert(fingerprint.into());
        }

        pub fn contains(&self, fingerprint: &Fingerprint) -> bool {
            self.inner.lock().entries.contains_key(fingerprint)
        }

        /// Get all recorded calls
        pub fn calls(&self) -> Vec<CacheCall> {
            self.inner.lock().calls.clone()
        }
    }

    #[async_trait]
    impl ArtifactCache for FakeArtifactCache {
        async fn fetch(&self, fingerprint: &Fingerprint) -> Result<CacheResult, CacheError> {
            let mut inner = self.inner.lock();
            inner.calls.push(CacheCall::Fetch(fingerprint.clone()));
            if inner.failing.contains(fingerprint) {
                return Err(CacheError::Backend(format!("fetch {} failed", fingerprint)));
            }
            Ok(match inner.entries.get(fingerprint) {
                Some(bytes) => CacheResult::Hit(bytes.clone()),
                None => CacheResult::Miss,
            })
        }

        async fn store(&self, fingerprint: &Fingerprint, artifact: &[u8]) -> Result<(), CacheError> {
            let mut inner = self.inner.lock();
            inner.calls.push(CacheCall::Store(fingerprint.clone(), artifact.len()));
            if inner.failing.contains(fingerprint) {
                return Err(CacheError::Backend(format!("store {} failed", fingerprint)));
            }
            inner.entries.insert(fingerprint.clone(), artifact.to_vec());
            Ok(())
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::{CacheCall, FakeArtifactCache};

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;
