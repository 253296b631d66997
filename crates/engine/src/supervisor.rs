// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process supervisor for a workspace's dev servers.
//!
//! Lifecycle per resource: unregistered -> starting -> running ->
//! stopping -> terminated. Starting a resource that is already running
//! stops the old instance first so two listeners never race for a port.

use crate::conflict::{ConflictChecker, PortConflict, Tolerance};
use crate::kill_tree::{kill_tree, process_tree, KillOutcome};
use crate::paths;
use berth_adapters::{ContainerRuntime, PortProbe, ProcessAdapter, ProcessError, SpawnRequest};
use berth_core::{validate_name, AllocationError, DevServerSpec, PORT_PLACEHOLDER};
use berth_storage::{PidFile, PidFileError, ProcessRecord};
use serde::Serialize;
use std::collections::BTreeSet;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("cannot start: {0}")]
    InvalidName(AllocationError),
    #[error("cannot start: {0}")]
    PortInUse(PortConflict),
    #[error(transparent)]
    Spawn(#[from] ProcessError),
    #[error(transparent)]
    Records(#[from] PidFileError),
}

/// A process to launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartRequest {
    pub name: String,
    pub directory: PathBuf,
    /// Command line; `{port}` is replaced with `port`.
    pub command: String,
    pub port: u16,
    /// Extra environment on top of `PORT`.
    pub env: Vec<(String, String)>,
}

impl StartRequest {
    /// Launch `spec` from `root` on `port`.
    pub fn dev_server(spec: &DevServerSpec, root: &Path, port: u16) -> Self {
        Self {
            name: spec.name.clone(),
            directory: root.join(&spec.directory),
            command: spec.command.clone(),
            port,
            env: Vec::new(),
        }
    }

    pub fn with_env(mut self, env: Vec<(String, String)>) -> Self {
        self.env = env;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessState {
    Running,
    Terminated,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessStatus {
    pub name: String,
    pub pid: u32,
    pub port: u16,
    pub directory: PathBuf,
    pub state: ProcessState,
}

impl ProcessStatus {
    pub fn running(&self) -> bool {
        self.state == ProcessState::Running
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stopped {
    pub name: String,
    pub pid: u32,
    /// None when the process had already exited.
    pub outcome: Option<KillOutcome>,
}

#[derive(Clone)]
pub struct Supervisor<P, C, N> {
    processes: P,
    checker: ConflictChecker<P, C, N>,
    pid_file: PidFile,
    logs_dir: PathBuf,
    grace: Duration,
}

impl<P: ProcessAdapter, C: ContainerRuntime, N: PortProbe> Supervisor<P, C, N> {
    /// Supervisor keeping its records under the workspace `root`.
    pub fn new(processes: P, checker: ConflictChecker<P, C, N>, root: &Path) -> Self {
        Self {
            processes,
            checker,
            pid_file: PidFile::new(paths::pid_file_path(root)),
            logs_dir: paths::logs_dir(root),
            grace: crate::env::stop_grace(),
        }
    }

    pub fn with_grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    pub fn pid_file(&self) -> &PidFile {
        &self.pid_file
    }

    pub fn log_path(&self, name: &str) -> PathBuf {
        paths::process_log_path(&self.logs_dir, name)
    }

    /// Launch `request` and record it. Returns the new pid.
    pub async fn start(&self, request: &StartRequest) -> Result<u32, SupervisorError> {
        validate_name(&request.name).map_err(SupervisorError::InvalidName)?;
        if let Some(previous) = self.pid_file.get(&request.name)? {
            if self.processes.is_alive(previous.pid).await {
                info!(name = request.name, pid = previous.pid, "already running, stopping first");
                kill_tree(&self.processes, previous.pid, self.grace).await;
            }
            self.pid_file.remove(&request.name)?;
        }

        if let Some(conflict) = self
            .checker
            .check_port(&request.name, request.port, &Tolerance::none())
            .await
        {
            return Err(SupervisorError::PortInUse(conflict));
        }

        let port = request.port.to_string();
        let mut env = vec![("PORT".to_string(), port.clone())];
        env.extend(request.env.iter().cloned());
        let spawn = SpawnRequest {
            command: request.command.replace(PORT_PLACEHOLDER, &port),
            cwd: request.directory.clone(),
            env,
            log_path: self.log_path(&request.name),
        };

        info!(name = request.name, port = request.port, "starting");
        let pid = self.processes.spawn(&spawn).await?;
        self.pid_file.upsert(ProcessRecord {
            name: request.name.clone(),
            pid,
            port: request.port,
            directory: request.directory.clone(),
        })?;
        info!(name = request.name, pid, "running");
        Ok(pid)
    }

    /// Stop every recorded process tree and clear the records, even when
    /// some kills fail.
    pub async fn stop_all(&self) -> Result<Vec<Stopped>, SupervisorError> {
        let records = match self.pid_file.load() {
            Ok(records) => records,
            Err(e) => {
                warn!(error = %e, "unreadable pid file, clearing it");
                self.pid_file.clear()?;
                return Err(e.into());
            }
        };

        let mut stopped = Vec::with_capacity(records.len());
        for record in records {
            let outcome = if self.processes.is_alive(record.pid).await {
                info!(name = record.name, pid = record.pid, "stopping");
                Some(kill_tree(&self.processes, record.pid, self.grace).await)
            } else {
                None
            };
            stopped.push(Stopped {
                name: record.name,
                pid: record.pid,
                outcome,
            });
        }

        self.pid_file.clear()?;
        Ok(stopped)
    }

    /// Liveness of each recorded process (pid check only).
    pub async fn status(&self) -> Result<Vec<ProcessStatus>, SupervisorError> {
        let mut statuses = Vec::new();
        for record in self.pid_file.load()? {
            let state = if self.processes.is_alive(record.pid).await {
                ProcessState::Running
            } else {
                ProcessState::Terminated
            };
            statuses.push(ProcessStatus {
                name: record.name,
                pid: record.pid,
                port: record.port,
                directory: record.directory,
                state,
            });
        }
        Ok(statuses)
    }

    /// Every pid in the trees of running supervised processes.
    pub async fn owned_pids(&self) -> BTreeSet<u32> {
        let mut owned = BTreeSet::new();
        let records = match self.pid_file.load() {
            Ok(records) => records,
            Err(e) => {
                warn!(error = %e, "unreadable pid file");
                return owned;
            }
        };
        for record in records {
            if self.processes.is_alive(record.pid).await {
                owned.extend(process_tree(&self.processes, record.pid).await);
            }
        }
        owned
    }

    /// Wait in the foreground until `shutdown` resolves or every supervised
    /// process has exited, then stop everything.
    pub async fn supervise<F>(&self, shutdown: F, poll: Duration) -> Result<Vec<Stopped>, SupervisorError>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("interrupted, stopping supervised processes");
                    break;
                }
                _ = tokio::time::sleep(poll) => {
                    let statuses = self.status().await?;
                    if statuses.iter().all(|s| !s.running()) {
                        info!("all supervised processes exited");
                        break;
                    }
                }
            }
        }
        self.stop_all().await
    }
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
