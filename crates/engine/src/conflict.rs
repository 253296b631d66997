// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Host-level port availability.
//!
//! A port is bound when a bind probe fails or a running container publishes
//! it (container port mappings are not always visible to a bind on the
//! host). Bound ports are attributed to the most specific holder we can
//! find. Nothing here mutates state.

use berth_adapters::{ContainerInfo, ContainerRuntime, PortProbe, ProcessAdapter};
use berth_core::{ClaimRecord, PortAllocation, WorkspaceName};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Who holds a bound port, in attribution preference order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PortHolder {
    Process { pid: u32, command: String },
    Container { name: String },
    Workspace { name: WorkspaceName, project_dir: PathBuf },
    Unknown,
}

impl PortHolder {
    /// What the user can do about it.
    pub fn hint(&self) -> String {
        match self {
            PortHolder::Process { pid, .. } => {
                format!("stop it with `kill {pid}` or rerun with --kill-conflicts")
            }
            PortHolder::Container { name } => format!("stop it with `docker stop {name}`"),
            PortHolder::Workspace { name, project_dir } => format!(
                "run `berth stop` in {} or `berth registry release {name}`",
                project_dir.display()
            ),
            PortHolder::Unknown => "find the listener with `lsof -iTCP -sTCP:LISTEN`".to_string(),
        }
    }
}

impl fmt::Display for PortHolder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortHolder::Process { pid, command } if command.is_empty() => {
                write!(f, "process {pid}")
            }
            PortHolder::Process { pid, command } => write!(f, "process {pid} ({command})"),
            PortHolder::Container { name } => write!(f, "container {name}"),
            PortHolder::Workspace { name, .. } => write!(f, "workspace {name}"),
            PortHolder::Unknown => f.write_str("unknown holder"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortConflict {
    pub port: u16,
    pub resource: String,
    pub holder: PortHolder,
}

impl fmt::Display for PortConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "port {} ({}) is held by {}",
            self.port, self.resource, self.holder
        )
    }
}

/// Result of checking a whole allocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConflictReport {
    pub conflicts: Vec<PortConflict>,
}

impl ConflictReport {
    pub fn is_ok(&self) -> bool {
        self.conflicts.is_empty()
    }
}

/// Whose bindings count as our own.
#[derive(Debug, Clone, Default)]
pub struct Tolerance {
    /// Containers carrying this workspace's prefix.
    pub workspace: Option<WorkspaceName>,
    /// Listeners that are this workspace's supervised processes.
    pub pids: BTreeSet<u32>,
}

impl Tolerance {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn workspace(workspace: WorkspaceName) -> Self {
        Self {
            workspace: Some(workspace),
            pids: BTreeSet::new(),
        }
    }

    pub fn with_pids(mut self, pids: impl IntoIterator<Item = u32>) -> Self {
        self.pids.extend(pids);
        self
    }
}

#[derive(Clone)]
pub struct ConflictChecker<P, C, N> {
    processes: P,
    containers: C,
    probe: N,
    claims: Vec<ClaimRecord>,
    block_size: u16,
}

impl<P: ProcessAdapter, C: ContainerRuntime, N: PortProbe> ConflictChecker<P, C, N> {
    pub fn new(processes: P, containers: C, probe: N) -> Self {
        Self {
            processes,
            containers,
            probe,
            claims: Vec::new(),
            block_size: 1,
        }
    }

    /// Live registry claims used to attribute otherwise anonymous bindings;
    /// each covers `block_size` ports from its base.
    pub fn with_claims(mut self, claims: Vec<ClaimRecord>, block_size: u16) -> Self {
        self.claims = claims;
        self.block_size = block_size.max(1);
        self
    }

    /// Check every host port of `allocation`.
    pub async fn check_all(
        &self,
        allocation: &PortAllocation,
        tolerance: &Tolerance,
    ) -> ConflictReport {
        let containers = self.running_containers().await;
        let mut conflicts = Vec::new();
        for (resource, port) in allocation.host_ports() {
            if let Some(holder) = self.holder(port, tolerance, &containers).await {
                conflicts.push(PortConflict {
                    port,
                    resource: resource.to_string(),
                    holder,
                });
            }
        }
        ConflictReport { conflicts }
    }

    /// Single-port variant used before starting a process.
    pub async fn check_port(
        &self,
        resource: &str,
        port: u16,
        tolerance: &Tolerance,
    ) -> Option<PortConflict> {
        let containers = self.running_containers().await;
        self.holder(port, tolerance, &containers)
            .await
            .map(|holder| PortConflict {
                port,
                resource: resource.to_string(),
                holder,
            })
    }

    /// The holder of `port` unless it is free or tolerated.
    async fn holder(
        &self,
        port: u16,
        tolerance: &Tolerance,
        containers: &[ContainerInfo],
    ) -> Option<PortHolder> {
        let publishing: Vec<&ContainerInfo> =
            containers.iter().filter(|c| c.publishes(port)).collect();
        if !self.probe.is_bound(port) && publishing.is_empty() {
            return None;
        }

        if let Some(workspace) = &tolerance.workspace {
            if publishing.iter().any(|c| workspace.owns_container(&c.name)) {
                debug!(port, workspace = %workspace, "bound by own container");
                return None;
            }
        }

        let listener = match self.processes.listener(port).await {
            Ok(listener) => listener,
            Err(e) => {
                debug!(port, error = %e, "listener lookup failed");
                None
            }
        };
        if let Some(listener) = listener {
            if tolerance.pids.contains(&listener.pid) {
                debug!(port, pid = listener.pid, "bound by own process");
                return None;
            }
            if publishing.is_empty() || !is_container_proxy(&listener.command) {
                return Some(PortHolder::Process {
                    pid: listener.pid,
                    command: listener.command,
                });
            }
        }

        if let Some(container) = publishing.first() {
            return Some(PortHolder::Container {
                name: container.name.clone(),
            });
        }

        let claim = self.claims.iter().find(|c| {
            c.covers_port(port, self.block_size)
                && tolerance.workspace.as_ref() != Some(&c.workspace)
        });
        Some(match claim {
            Some(claim) => PortHolder::Workspace {
                name: claim.workspace.clone(),
                project_dir: claim.project_dir.clone(),
            },
            None => PortHolder::Unknown,
        })
    }

    async fn running_containers(&self) -> Vec<ContainerInfo> {
        match self.containers.running().await {
            Ok(running) => running,
            Err(e) => {
                warn!(error = %e, "container runtime unavailable, checking host bindings only");
                Vec::new()
            }
        }
    }
}

/// Listeners that forward a published container port on the host.
fn is_container_proxy(command: &str) -> bool {
    command.contains("docker") || command.contains("vpnkit") || command.contains("rootlessport")
}

#[cfg(test)]
#[path = "conflict_tests.rs"]
mod tests;
