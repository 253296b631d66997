// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake process table for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{PortListener, ProcessAdapter, ProcessError, Signal, SpawnRequest};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Recorded process call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessCall {
    Signal { pid: u32, signal: Signal },
    Spawn(SpawnRequest),
}

/// A process in the fake table
#[derive(Debug, Clone)]
pub struct FakeProcess {
    pub pid: u32,
    pub parent: Option<u32>,
    pub command: String,
    pub alive: bool,
    /// Survives SIGTERM, only SIGKILL stops it
    pub ignores_term: bool,
}

struct FakeProcessState {
    processes: BTreeMap<u32, FakeProcess>,
    listeners: BTreeMap<u16, u32>,
    next_pid: u32,
    spawn_error: Option<String>,
    calls: Vec<ProcessCall>,
}

/// Fake process adapter for testing
#[derive(Clone)]
pub struct FakeProcessAdapter {
    inner: Arc<Mutex<FakeProcessState>>,
}

impl Default for FakeProcessAdapter {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeProcessState {
                processes: BTreeMap::new(),
                listeners: BTreeMap::new(),
                next_pid: 5000,
                spawn_error: None,
                calls: Vec::new(),
            })),
        }
    }
}

impl FakeProcessAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a live process
    pub fn add_process(&self, pid: u32, parent: Option<u32>, command: &str) {
        self.inner.lock().processes.insert(
            pid,
            FakeProcess {
                pid,
                parent,
                command: command.to_string(),
                alive: true,
                ignores_term: false,
            },
        );
    }

    /// Make a process survive SIGTERM
    pub fn ignore_term(&self, pid: u32) {
        if let Some(p) = self.inner.lock().processes.get_mut(&pid) {
            p.ignores_term = true;
        }
    }

    /// Mark a process dead without a signal
    pub fn exit(&self, pid: u32) {
        if let Some(p) = self.inner.lock().processes.get_mut(&pid) {
            p.alive = false;
        }
    }

    /// Bind `port` to a process for listener lookups
    pub fn listen(&self, port: u16, pid: u32) {
        self.inner.lock().listeners.insert(port, pid);
    }

    /// Make every subsequent spawn fail
    pub fn fail_spawns(&self, message: &str) {
        self.inner.lock().spawn_error = Some(message.to_string());
    }

    pub fn process(&self, pid: u32) -> Option<FakeProcess> {
        self.inner.lock().processes.get(&pid).cloned()
    }

    /// Requests passed to `spawn`, in order
    pub fn spawned(&self) -> Vec<SpawnRequest> {
        self.inner
            .lock()
            .calls
            .iter()
            .filter_map(|c| match c {
                ProcessCall::Spawn(req) => Some(req.clone()),
                _ => None,
            })
            .collect()
    }

    /// (pid, signal) pairs in delivery order
    pub fn signals(&self) -> Vec<(u32, Signal)> {
        self.inner
            .lock()
            .calls
            .iter()
            .filter_map(|c| match c {
                ProcessCall::Signal { pid, signal } => Some((*pid, *signal)),
                _ => None,
            })
            .collect()
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<ProcessCall> {
        self.inner.lock().calls.clone()
    }
}

#[async_trait]
impl ProcessAdapter for FakeProcessAdapter {
    async fn is_alive(&self, pid: u32) -> bool {
        pid != 0
            && self
                .inner
                .lock()
                .processes
                .get(&pid)
                .is_some_and(|p| p.alive)
    }

    async fn children(&self, pid: u32) -> Result<Vec<u32>, ProcessError> {
        Ok(self
            .inner
            .lock()
            .processes
            .values()
            .filter(|p| p.alive && p.parent == Some(pid))
            .map(|p| p.pid)
            .collect())
    }

    async fn signal(&self, pid: u32, signal: Signal) -> Result<(), ProcessError> {
        let mut inner = self.inner.lock();
        inner.calls.push(ProcessCall::Signal { pid, signal });
        let Some(process) = inner.processes.get_mut(&pid).filter(|p| p.alive) else {
            return Err(ProcessError::NotFound(pid));
        };
        if signal == Signal::Kill || !process.ignores_term {
            process.alive = false;
        }
        Ok(())
    }

    async fn listener(&self, port: u16) -> Result<Option<PortListener>, ProcessError> {
        let inner = self.inner.lock();
        Ok(inner
            .listeners
            .get(&port)
            .and_then(|pid| inner.processes.get(pid))
            .filter(|p| p.alive)
            .map(|p| PortListener {
                pid: p.pid,
                command: p.command.clone(),
            }))
    }

    async fn spawn(&self, request: &SpawnRequest) -> Result<u32, ProcessError> {
        let mut inner = self.inner.lock();
        inner.calls.push(ProcessCall::Spawn(request.clone()));
        if let Some(message) = inner.spawn_error.clone() {
            return Err(ProcessError::SpawnFailed {
                command: request.command.clone(),
                message,
            });
        }
        let pid = inner.next_pid;
        inner.next_pid += 1;
        inner.processes.insert(
            pid,
            FakeProcess {
                pid,
                parent: None,
                command: request.command.clone(),
                alive: true,
                ignores_term: false,
            },
        );
        Ok(pid)
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
