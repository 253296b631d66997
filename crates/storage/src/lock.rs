// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Directory-based mutual exclusion across processes.
//!
//! `mkdir` is atomic on every filesystem we care about, so whoever creates
//! the lock directory owns it. Ownership is not recorded: a directory older
//! than [`LockConfig::stale_after`] is presumed abandoned by a crashed
//! holder and removed. That reclaim is a heuristic, not a guarantee.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum LockError {
    #[error("timed out after {}ms waiting for lock {}", waited.as_millis(), path.display())]
    Timeout { path: PathBuf, waited: Duration },
    #[error("lock {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockConfig {
    /// How long `acquire` keeps retrying before checking for staleness.
    pub wait: Duration,
    /// Delay between attempts.
    pub poll: Duration,
    /// Age past which an existing lock directory is reclaimed.
    pub stale_after: Duration,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            wait: Duration::from_secs(5),
            poll: Duration::from_secs(1),
            stale_after: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DirLock {
    path: PathBuf,
    config: LockConfig,
}

/// Held lock; the directory is removed on drop.
#[derive(Debug)]
pub struct LockGuard {
    path: PathBuf,
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        remove_lock_dir(&self.path);
    }
}

impl DirLock {
    pub fn new(path: impl Into<PathBuf>, config: LockConfig) -> Self {
        Self {
            path: path.into(),
            config,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> LockConfig {
        self.config
    }

    /// Take the lock, waiting up to `wait` and then reclaiming a stale one.
    pub fn acquire(&self) -> Result<LockGuard, LockError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| self.io_error(source))?;
        }

        let start = Instant::now();
        loop {
            if self.try_create()? {
                return Ok(self.guard());
            }
            let elapsed = start.elapsed();
            if elapsed >= self.config.wait {
                break;
            }
            std::thread::sleep(self.config.poll.min(self.config.wait - elapsed));
        }

        match self.age() {
            Some(age) if age > self.config.stale_after => {
                warn!(
                    path = %self.path.display(),
                    age_ms = age.as_millis() as u64,
                    "reclaiming stale lock"
                );
                remove_lock_dir(&self.path);
                if self.try_create()? {
                    return Ok(self.guard());
                }
            }
            Some(age) => debug!(age_ms = age.as_millis() as u64, "lock held and fresh"),
            None => {
                // Released between the last attempt and the age check
                if self.try_create()? {
                    return Ok(self.guard());
                }
            }
        }

        Err(LockError::Timeout {
            path: self.path.clone(),
            waited: start.elapsed(),
        })
    }

    /// Run `f` while holding the lock.
    pub fn with_lock<T>(&self, f: impl FnOnce() -> T) -> Result<T, LockError> {
        let _guard = self.acquire()?;
        Ok(f())
    }

    /// Remove the lock directory. Idempotent; never fails.
    pub fn unlock(&self) {
        remove_lock_dir(&self.path);
    }

    pub fn is_held(&self) -> bool {
        self.path.is_dir()
    }

    fn try_create(&self) -> Result<bool, LockError> {
        match fs::create_dir(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(false),
            Err(source) => Err(self.io_error(source)),
        }
    }

    fn age(&self) -> Option<Duration> {
        let modified = fs::metadata(&self.path).and_then(|m| m.modified()).ok()?;
        Some(
            SystemTime::now()
                .duration_since(modified)
                .unwrap_or(Duration::ZERO),
        )
    }

    fn guard(&self) -> LockGuard {
        LockGuard {
            path: self.path.clone(),
        }
    }

    fn io_error(&self, source: io::Error) -> LockError {
        LockError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

fn remove_lock_dir(path: &Path) {
    match fs::remove_dir_all(path) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "failed to remove lock"),
    }
}

#[cfg(test)]
#[path = "lock_tests.rs"]
mod tests;
