// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Liveness oracle: is the workspace behind a claim still running?
//!
//! A claim is live when its owner pid exists, or failing that when any
//! running container carries the workspace's compose prefix. PID reuse can
//! make a dead claim look live; that false positive is accepted.

use berth_adapters::{ContainerInfo, ContainerRuntime, ProcessAdapter};
use berth_core::{ClaimRecord, WorkspaceName};
use std::path::Path;
use tracing::{debug, warn};

#[derive(Clone)]
pub struct LivenessOracle<P, C> {
    processes: P,
    containers: C,
}

impl<P: ProcessAdapter, C: ContainerRuntime> LivenessOracle<P, C> {
    pub fn new(processes: P, containers: C) -> Self {
        Self {
            processes,
            containers,
        }
    }

    pub fn processes(&self) -> &P {
        &self.processes
    }

    pub fn containers(&self) -> &C {
        &self.containers
    }

    /// Whether the workspace rooted at `project_dir` (claimed by `owner_pid`)
    /// is still active.
    pub async fn is_alive(&self, project_dir: &Path, owner_pid: u32) -> bool {
        if self.processes.is_alive(owner_pid).await {
            return true;
        }
        let running = self.running_containers().await;
        owns_any(project_dir, &running)
    }

    /// Split `records` into (live, dead). The container list is fetched at
    /// most once for the whole batch.
    pub async fn partition(
        &self,
        records: Vec<ClaimRecord>,
    ) -> (Vec<ClaimRecord>, Vec<ClaimRecord>) {
        let mut containers: Option<Vec<ContainerInfo>> = None;
        let mut live = Vec::new();
        let mut dead = Vec::new();
        for record in records {
            let alive = if self.processes.is_alive(record.owner_pid).await {
                true
            } else {
                if containers.is_none() {
                    containers = Some(self.running_containers().await);
                }
                containers
                    .as_deref()
                    .is_some_and(|running| owns_any(&record.project_dir, running))
            };
            debug!(workspace = %record.workspace, alive, "liveness checked");
            if alive {
                live.push(record);
            } else {
                dead.push(record);
            }
        }
        (live, dead)
    }

    /// Running containers, or none when the runtime cannot be queried.
    pub async fn running_containers(&self) -> Vec<ContainerInfo> {
        match self.containers.running().await {
            Ok(running) => running,
            Err(e) => {
                warn!(error = %e, "container runtime unavailable, treating as no containers");
                Vec::new()
            }
        }
    }
}

fn owns_any(project_dir: &Path, containers: &[ContainerInfo]) -> bool {
    let Ok(workspace) = WorkspaceName::from_dir(project_dir) else {
        return false;
    };
    containers.iter().any(|c| workspace.owns_container(&c.name))
}

#[cfg(test)]
#[path = "liveness_tests.rs"]
mod tests;
