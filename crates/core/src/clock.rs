// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Clock abstraction so timeouts and retention can be driven from tests.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Source of monotonic and wall-clock time.
pub trait Clock: Clone + Send + Sync + 'static {
    /// Monotonic time, for measuring idle windows
    fn now(&self) -> Instant;
    /// Wall-clock milliseconds since the Unix epoch, for recorded timestamps
    fn epoch_ms(&self) -> u64;
}

/// Whole milliseconds in `duration`, saturating at `u64::MAX`.
pub fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn epoch_ms(&self) -> u64 {
        duration_ms(SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default())
    }
}

#[derive(Debug)]
struct FakeTime {
    instant: Instant,
    epoch_ms: u64,
}

/// Manually advanced clock. Clones share the same time.
#[derive(Clone, Debug)]
pub struct FakeClock {
    time: Arc<Mutex<FakeTime>>,
}

impl FakeClock {
    pub fn new() -> Self {
        Self {
            time: Arc::new(Mutex::new(FakeTime { instant: Instant::now(), epoch_ms: 1_000_000 })),
        }
    }

    /// Move both monotonic and wall-clock time forward.
    pub fn advance(&self, duration: Duration) {
        let mut time = self.time.lock();
        time.instant += duration;
        time.epoch_ms = time.epoch_ms.saturating_add(duration_ms(duration));
    }

    pub fn set_epoch_ms(&self, ms: u64) {
        self.time.lock().epoch_ms = ms;
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Instant {
        self.time.lock().instant
    }

    fn epoch_ms(&self) -> u64 {
        self.time.lock().epoch_ms
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
