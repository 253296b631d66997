// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-workspace record of supervised processes.
//!
//! One `name:pid:port:directory` line per started resource. The directory
//! is the last field so colons inside paths survive the split. This file is
//! private to one workspace and needs no locking.

use crate::atomic::write_atomic;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum PidFileError {
    #[error("process name {0:?} may not contain ':' or a newline")]
    InvalidName(String),
    #[error("pid file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessRecord {
    pub name: String,
    pub pid: u32,
    pub port: u16,
    pub directory: PathBuf,
}

impl ProcessRecord {
    fn to_line(&self) -> String {
        format!(
            "{}:{}:{}:{}",
            self.name,
            self.pid,
            self.port,
            self.directory.display()
        )
    }

    fn parse_line(line: &str) -> Option<Self> {
        let mut parts = line.splitn(4, ':');
        let name = parts.next().filter(|n| !n.is_empty())?;
        let pid = parts.next()?.parse().ok()?;
        let port = parts.next()?.parse().ok()?;
        let directory = parts.next()?;
        Some(Self {
            name: name.to_string(),
            pid,
            port,
            directory: PathBuf::from(directory),
        })
    }
}

#[derive(Debug, Clone)]
pub struct PidFile {
    path: PathBuf,
}

impl PidFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All parseable records; a missing file has none.
    pub fn load(&self) -> Result<Vec<ProcessRecord>, PidFileError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(self.io_error(source)),
        };
        Ok(content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| {
                let parsed = ProcessRecord::parse_line(line);
                if parsed.is_none() {
                    warn!(path = %self.path.display(), line, "skipping malformed pid record");
                }
                parsed
            })
            .collect())
    }

    pub fn get(&self, name: &str) -> Result<Option<ProcessRecord>, PidFileError> {
        Ok(self.load()?.into_iter().find(|r| r.name == name))
    }

    /// Insert `record`, replacing any previous record with the same name.
    pub fn upsert(&self, record: ProcessRecord) -> Result<(), PidFileError> {
        if record.name.is_empty() || record.name.contains([':', '\n', '\r']) {
            return Err(PidFileError::InvalidName(record.name));
        }
        let mut records = self.load()?;
        records.retain(|r| r.name != record.name);
        records.push(record);
        self.write(&records)
    }

    pub fn remove(&self, name: &str) -> Result<(), PidFileError> {
        let mut records = self.load()?;
        let before = records.len();
        records.retain(|r| r.name != name);
        if records.len() == before {
            return Ok(());
        }
        if records.is_empty() {
            return self.clear();
        }
        self.write(&records)
    }

    /// Delete the file. Idempotent.
    pub fn clear(&self) -> Result<(), PidFileError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(self.io_error(source)),
        }
    }

    fn write(&self, records: &[ProcessRecord]) -> Result<(), PidFileError> {
        let mut content = String::new();
        for record in records {
            content.push_str(&record.to_line());
            content.push('\n');
        }
        write_atomic(&self.path, content.as_bytes()).map_err(|source| self.io_error(source))
    }

    fn io_error(&self, source: io::Error) -> PidFileError {
        PidFileError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[cfg(test)]
#[path = "pid_file_tests.rs"]
mod tests;
