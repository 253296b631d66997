// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the CLI crate.

use std::path::PathBuf;

/// Resolve berth home: BERTH_HOME > XDG_STATE_HOME/berth > ~/.local/state/berth
pub fn berth_home() -> Option<PathBuf> {
    if let Some(dir) = std::env::var_os("BERTH_HOME").filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(dir));
    }
    if let Some(xdg) = std::env::var_os("XDG_STATE_HOME").filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(xdg).join("berth"));
    }
    dirs::home_dir().map(|home| home.join(".local/state/berth"))
}

/// Tracing filter directives (default: warn)
pub fn log_filter() -> String {
    std::env::var("BERTH_LOG")
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "warn".to_string())
}

// --- Color ---

pub fn no_color() -> bool {
    std::env::var("NO_COLOR").is_ok_and(|v| v == "1")
}

pub fn force_color() -> bool {
    std::env::var("COLOR").is_ok_and(|v| v == "1")
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
