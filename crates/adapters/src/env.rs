// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the adapters crate.

use std::time::Duration;

fn parse_duration_ms(var: &str) -> Option<Duration> {
    std::env::var(var)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
}

/// Container CLI binary (default: `docker`).
pub fn docker_binary() -> String {
    std::env::var("BERTH_DOCKER")
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "docker".to_string())
}

/// Timeout for container runtime queries (default: 5000ms).
pub fn docker_timeout() -> Duration {
    parse_duration_ms("BERTH_DOCKER_TIMEOUT_MS").unwrap_or(Duration::from_secs(5))
}

/// `BERTH_NO_DOCKER` set to anything but empty, `0` or `false`.
pub fn docker_disabled() -> bool {
    std::env::var("BERTH_NO_DOCKER")
        .map(|v| !matches!(v.trim(), "" | "0" | "false"))
        .unwrap_or(false)
}
