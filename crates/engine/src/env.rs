// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tunables read from the environment.

use berth_storage::LockConfig;
use std::time::Duration;

fn parse_duration_ms(var: &str) -> Option<Duration> {
    std::env::var(var)
        .ok()
        .and_then(|s| s.trim().parse::<u64>().ok())
        .map(Duration::from_millis)
}

/// Registry lock timing from `BERTH_LOCK_WAIT_MS`, `BERTH_LOCK_POLL_MS`
/// and `BERTH_LOCK_STALE_MS`, falling back to 5s / 1s / 30s.
pub fn lock_config() -> LockConfig {
    let defaults = LockConfig::default();
    LockConfig {
        wait: parse_duration_ms("BERTH_LOCK_WAIT_MS").unwrap_or(defaults.wait),
        poll: parse_duration_ms("BERTH_LOCK_POLL_MS")
            .filter(|d| !d.is_zero())
            .unwrap_or(defaults.poll),
        stale_after: parse_duration_ms("BERTH_LOCK_STALE_MS").unwrap_or(defaults.stale_after),
    }
}

/// Grace between SIGTERM and SIGKILL when stopping a process tree.
pub fn stop_grace() -> Duration {
    parse_duration_ms("BERTH_STOP_GRACE_MS").unwrap_or(Duration::from_secs(2))
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
