// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workspace identity.
//!
//! A workspace is one working copy (usually a git worktree) of a project.
//! Its name is both the hashing key for the port grid and the dedup key in
//! the shared registry, so it must be non-empty and must never contain the
//! registry's field or record separators.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NameError {
    #[error("workspace name is empty")]
    Empty,
    #[error("workspace name {0:?} contains a tab or newline")]
    ControlCharacter(String),
}

/// Name of a workspace, validated on construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WorkspaceName(String);

impl WorkspaceName {
    pub fn new(name: impl Into<String>) -> Result<Self, NameError> {
        let name = name.into();
        if name.is_empty() {
            return Err(NameError::Empty);
        }
        if name.contains(['\t', '\n', '\r']) {
            return Err(NameError::ControlCharacter(name));
        }
        Ok(Self(name))
    }

    /// Derive the name from a workspace root directory (its basename).
    pub fn from_dir(dir: &Path) -> Result<Self, NameError> {
        let base = dir
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        Self::new(base)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Prefix that containers started for this workspace carry.
    pub fn container_prefix(&self) -> String {
        compose_project_name(&self.0)
    }

    /// Whether `container` was started for this workspace.
    ///
    /// The prefix must be followed by a compose separator (`-` or `_`) or end
    /// the name, so `foo` never claims `foobar-db-1`.
    pub fn owns_container(&self, container: &str) -> bool {
        let prefix = self.container_prefix();
        if prefix.is_empty() {
            return false;
        }
        match container.strip_prefix(prefix.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with(['-', '_']),
            None => false,
        }
    }
}

impl fmt::Display for WorkspaceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for WorkspaceName {
    type Error = NameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<WorkspaceName> for String {
    fn from(name: WorkspaceName) -> Self {
        name.0
    }
}

impl PartialEq<str> for WorkspaceName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for WorkspaceName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Normalize a directory or workspace name the way docker compose derives
/// its default project name: lowercase, keeping only `[a-z0-9_-]`.
pub fn compose_project_name(raw: &str) -> String {
    raw.chars()
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect()
}

#[cfg(test)]
#[path = "workspace_tests.rs"]
mod tests;
