// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! OS process adapters: liveness, descendants, signals, port listeners, spawn

mod system;

pub use system::{parse_lsof_fields, SystemProcesses};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeProcess, FakeProcessAdapter, ProcessCall};

use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Errors from process operations
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("no such process: {0}")]
    NotFound(u32),
    #[error("failed to signal process {pid}: {message}")]
    SignalFailed { pid: u32, message: String },
    #[error("failed to spawn `{command}`: {message}")]
    SpawnFailed { command: String, message: String },
    #[error("process query failed: {0}")]
    QueryFailed(String),
}

/// Signals berth sends to processes it manages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Term,
    Kill,
}

impl Signal {
    /// Argument form for `kill(1)`
    pub fn as_arg(self) -> &'static str {
        match self {
            Signal::Term => "-TERM",
            Signal::Kill => "-KILL",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Term => f.write_str("SIGTERM"),
            Signal::Kill => f.write_str("SIGKILL"),
        }
    }
}

/// A process listening on a TCP port
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortListener {
    pub pid: u32,
    pub command: String,
}

/// How to launch a managed process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnRequest {
    /// Shell command line, run through `sh -c`
    pub command: String,
    pub cwd: PathBuf,
    pub env: Vec<(String, String)>,
    /// stdout and stderr are appended here
    pub log_path: PathBuf,
}

/// Adapter over the host's process table
#[async_trait]
pub trait ProcessAdapter: Clone + Send + Sync + 'static {
    /// Whether `pid` names a running, non-zombie process.
    ///
    /// pid 0 is never alive.
    async fn is_alive(&self, pid: u32) -> bool;

    /// Direct children of `pid`.
    async fn children(&self, pid: u32) -> Result<Vec<u32>, ProcessError>;

    /// Send `signal` to a single process.
    async fn signal(&self, pid: u32, signal: Signal) -> Result<(), ProcessError>;

    /// The process listening on TCP `port`, if one can be identified.
    async fn listener(&self, port: u16) -> Result<Option<PortListener>, ProcessError>;

    /// Launch a detached process and return its pid.
    async fn spawn(&self, request: &SpawnRequest) -> Result<u32, ProcessError>;
}
