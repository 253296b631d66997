// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wall-clock abstraction for claim timestamps.

use std::time::{SystemTime, UNIX_EPOCH};

/// Source of the current time in whole epoch seconds.
pub trait Clock: Clone + Send + Sync {
    fn epoch_secs(&self) -> u64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn epoch_secs(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeClock;

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::Clock;
    use parking_lot::Mutex;
    use std::sync::Arc;

    /// Manually driven clock for tests.
    #[derive(Debug, Clone)]
    pub struct FakeClock {
        now: Arc<Mutex<u64>>,
    }

    impl FakeClock {
        pub fn new(epoch_secs: u64) -> Self {
            Self {
                now: Arc::new(Mutex::new(epoch_secs)),
            }
        }

        pub fn set(&self, epoch_secs: u64) {
            *self.now.lock() = epoch_secs;
        }

        pub fn advance(&self, secs: u64) {
            *self.now.lock() += secs;
        }
    }

    impl Default for FakeClock {
        fn default() -> Self {
            Self::new(1_000_000)
        }
    }

    impl Clock for FakeClock {
        fn epoch_secs(&self) -> u64 {
            *self.now.lock()
        }
    }
}
