// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Registry claim records and their line codec.
//!
//! One record per line, five tab-separated fields in fixed order:
//! `base_port`, `workspace`, `project_dir`, `claimed_at` (epoch seconds),
//! `owner_pid`. Tabs never occur in a workspace name (validated) and are
//! rejected in project paths, so the split is unambiguous.

use crate::workspace::{NameError, WorkspaceName};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Separator between fields of a registry line.
pub const FIELD_DELIMITER: char = '\t';

const FIELD_COUNT: usize = 5;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClaimParseError {
    #[error("expected {FIELD_COUNT} fields, found {0}")]
    FieldCount(usize),
    #[error("invalid {field}: {value:?}")]
    InvalidField { field: &'static str, value: String },
    #[error(transparent)]
    Name(#[from] NameError),
    #[error("project dir {0:?} is not representable in the registry")]
    UnencodablePath(PathBuf),
}

/// Assertion that a workspace currently owns a base port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimRecord {
    pub base_port: u16,
    pub workspace: WorkspaceName,
    pub project_dir: PathBuf,
    pub claimed_at: u64,
    pub owner_pid: u32,
}

impl ClaimRecord {
    /// Build a record, rejecting project paths the line format cannot carry.
    pub fn new(
        base_port: u16,
        workspace: WorkspaceName,
        project_dir: impl Into<PathBuf>,
        claimed_at: u64,
        owner_pid: u32,
    ) -> Result<Self, ClaimParseError> {
        let project_dir = project_dir.into();
        check_path(&project_dir)?;
        Ok(Self {
            base_port,
            workspace,
            project_dir,
            claimed_at,
            owner_pid,
        })
    }

    /// Encode as a registry line (without trailing newline).
    pub fn to_line(&self) -> String {
        let d = FIELD_DELIMITER;
        format!(
            "{}{d}{}{d}{}{d}{}{d}{}",
            self.base_port,
            self.workspace,
            self.project_dir.display(),
            self.claimed_at,
            self.owner_pid,
        )
    }

    /// Decode one registry line.
    pub fn parse_line(line: &str) -> Result<Self, ClaimParseError> {
        let fields: Vec<&str> = line.split(FIELD_DELIMITER).collect();
        if fields.len() != FIELD_COUNT {
            return Err(ClaimParseError::FieldCount(fields.len()));
        }
        let base_port = parse_field("base_port", fields[0])?;
        let workspace = WorkspaceName::new(fields[1])?;
        if fields[2].is_empty() {
            return Err(ClaimParseError::InvalidField {
                field: "project_dir",
                value: String::new(),
            });
        }
        let claimed_at = parse_field("claimed_at", fields[3])?;
        let owner_pid = parse_field("owner_pid", fields[4])?;
        Ok(Self {
            base_port,
            workspace,
            project_dir: PathBuf::from(fields[2]),
            claimed_at,
            owner_pid,
        })
    }

    /// Whether `port` falls inside this claim's block of `block_size` ports.
    pub fn covers_port(&self, port: u16, block_size: u16) -> bool {
        let start = u32::from(self.base_port);
        let port = u32::from(port);
        port >= start && port < start + u32::from(block_size)
    }
}

fn parse_field<T: std::str::FromStr>(field: &'static str, value: &str) -> Result<T, ClaimParseError> {
    value.parse().map_err(|_| ClaimParseError::InvalidField {
        field,
        value: value.to_string(),
    })
}

fn check_path(path: &Path) -> Result<(), ClaimParseError> {
    match path.to_str() {
        Some(s) if !s.is_empty() && !s.contains([FIELD_DELIMITER, '\n', '\r']) => Ok(()),
        _ => Err(ClaimParseError::UnencodablePath(path.to_path_buf())),
    }
}

#[cfg(test)]
#[path = "claim_tests.rs"]
mod tests;
