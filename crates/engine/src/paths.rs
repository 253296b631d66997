// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared path builders for machine-wide and per-workspace state.
//!
//! Machine-wide, under the berth home:
//!   `{home}/registry.tsv`
//!   `{home}/registry.tsv.lock/`
//!
//! Per workspace, under the workspace root:
//!   `{root}/.berth/pids`
//!   `{root}/.berth/logs/{name}.log`

use std::path::{Path, PathBuf};

/// Directory name for per-workspace state.
pub const STATE_DIR_NAME: &str = ".berth";

/// Build the path to the claim registry.
///
/// Structure: `{home}/registry.tsv`
pub fn registry_path(home: &Path) -> PathBuf {
    home.join("registry.tsv")
}

/// Structure: `{root}/.berth`
pub fn workspace_state_dir(root: &Path) -> PathBuf {
    root.join(STATE_DIR_NAME)
}

/// Build the path to a workspace's supervised-process record.
///
/// Structure: `{root}/.berth/pids`
pub fn pid_file_path(root: &Path) -> PathBuf {
    workspace_state_dir(root).join("pids")
}

/// Structure: `{root}/.berth/logs`
pub fn logs_dir(root: &Path) -> PathBuf {
    workspace_state_dir(root).join("logs")
}

/// Build the path to a supervised process's output log.
///
/// Structure: `{logs_dir}/{name}.log`
pub fn process_log_path(logs_dir: &Path, name: &str) -> PathBuf {
    logs_dir.join(format!("{}.log", name))
}

#[cfg(test)]
#[path = "paths_tests.rs"]
mod tests;
