// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Machine-wide claim registry.
//!
//! A single text file of [`ClaimRecord`] lines shared by every workspace on
//! the host. Mutations take the `<path>.lock` directory lock and rewrite the
//! whole file atomically; reads take no lock because a rename is never
//! observed half-done.

use crate::atomic::write_atomic;
use crate::lock::{DirLock, LockConfig, LockError};
use berth_core::{ClaimRecord, WorkspaceName};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error(transparent)]
    Lock(#[from] LockError),
    #[error("registry {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl RegistryError {
    /// Whether the failure was lock contention rather than I/O.
    pub fn is_lock_timeout(&self) -> bool {
        matches!(self, RegistryError::Lock(LockError::Timeout { .. }))
    }
}

#[derive(Debug, Clone)]
pub struct RegistryFile {
    path: PathBuf,
    lock: DirLock,
}

impl RegistryFile {
    pub fn new(path: impl Into<PathBuf>, lock_config: LockConfig) -> Self {
        let path = path.into();
        let lock = DirLock::new(Self::lock_path(&path), lock_config);
        Self { path, lock }
    }

    /// `<registry path>.lock`
    pub fn lock_path(path: &Path) -> PathBuf {
        let mut os = path.as_os_str().to_os_string();
        os.push(".lock");
        PathBuf::from(os)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn lock(&self) -> &DirLock {
        &self.lock
    }

    /// Read every well-formed record without locking.
    ///
    /// A missing file is an empty registry. Malformed lines, including ones
    /// that are not UTF-8, are skipped and disappear on the next rewrite.
    pub fn read(&self) -> Result<Vec<ClaimRecord>, RegistryError> {
        let content = match fs::read(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(self.io_error(source)),
        };
        Ok(content
            .split(|byte| *byte == b'\n')
            .enumerate()
            .filter_map(|(index, bytes)| {
                let parsed = std::str::from_utf8(bytes)
                    .map_err(|e| e.to_string())
                    .map(|line| line.strip_suffix('\r').unwrap_or(line))
                    .and_then(|line| {
                        if line.trim().is_empty() {
                            return Ok(None);
                        }
                        ClaimRecord::parse_line(line).map(Some).map_err(|e| e.to_string())
                    });
                match parsed {
                    Ok(record) => record,
                    Err(error) => {
                        warn!(
                            path = %self.path.display(),
                            line = index + 1,
                            error = %error,
                            "skipping malformed registry line"
                        );
                        None
                    }
                }
            })
            .collect())
    }

    /// Consistent copy of all records, read under the lock.
    pub fn snapshot(&self) -> Result<Vec<ClaimRecord>, RegistryError> {
        let _guard = self.lock.acquire()?;
        self.read()
    }

    /// Replace any record for `record.workspace` with `record`.
    pub fn claim(&self, record: ClaimRecord) -> Result<(), RegistryError> {
        let _guard = self.lock.acquire()?;
        let mut records = self.read()?;
        records.retain(|r| r.workspace != record.workspace);
        debug!(
            workspace = %record.workspace,
            base_port = record.base_port,
            "writing claim"
        );
        records.push(record);
        self.write(&records)
    }

    /// Drop the record for `workspace`. Returns whether one existed.
    pub fn release(&self, workspace: &WorkspaceName) -> Result<bool, RegistryError> {
        let _guard = self.lock.acquire()?;
        let mut records = self.read()?;
        let before = records.len();
        records.retain(|r| &r.workspace != workspace);
        if records.len() == before {
            return Ok(false);
        }
        self.write(&records)?;
        Ok(true)
    }

    /// Drop records identical to one of `stale`. A workspace that re-claimed
    /// since `stale` was read has a different record and survives.
    pub fn remove_exact(&self, stale: &[ClaimRecord]) -> Result<usize, RegistryError> {
        if stale.is_empty() {
            return Ok(0);
        }
        let _guard = self.lock.acquire()?;
        let mut records = self.read()?;
        let before = records.len();
        records.retain(|r| !stale.contains(r));
        let removed = before - records.len();
        if removed > 0 {
            self.write(&records)?;
        }
        Ok(removed)
    }

    fn write(&self, records: &[ClaimRecord]) -> Result<(), RegistryError> {
        let mut content = String::new();
        for record in records {
            content.push_str(&record.to_line());
            content.push('\n');
        }
        write_atomic(&self.path, content.as_bytes()).map_err(|source| self.io_error(source))
    }

    fn io_error(&self, source: io::Error) -> RegistryError {
        RegistryError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
