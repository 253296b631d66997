// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Port generator: workspace identity to base port.
//!
//! The main checkout always gets the configured default port. Every other
//! workspace hashes onto the grid and probes past buckets held by live
//! claims of other workspaces, up to `max_probes` attempts.

use crate::registry::ClaimRegistry;
use berth_adapters::{ContainerRuntime, ProcessAdapter};
use berth_core::{Clock, PortGrid, WorkspaceName};
use serde::Serialize;
use std::path::Path;
use tracing::{debug, warn};

/// Outcome of choosing a base port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BasePort {
    pub port: u16,
    /// Probe attempts past the home bucket (0 when it was free).
    pub probes: u32,
    /// Every probed candidate was held; `port` is the last candidate.
    pub exhausted: bool,
}

pub struct PortGenerator<'a, P, C, K> {
    grid: PortGrid,
    registry: &'a ClaimRegistry<P, C, K>,
}

impl<'a, P: ProcessAdapter, C: ContainerRuntime, K: Clock> PortGenerator<'a, P, C, K> {
    pub fn new(grid: PortGrid, registry: &'a ClaimRegistry<P, C, K>) -> Self {
        Self { grid, registry }
    }

    /// Choose a base port without touching the registry.
    pub async fn resolve(&self, workspace: &WorkspaceName, project: &str) -> BasePort {
        if PortGrid::is_main(workspace.as_str(), project) {
            return BasePort {
                port: self.grid.default_port,
                probes: 0,
                exhausted: false,
            };
        }

        let mut candidate = self.grid.candidate(workspace.as_str(), 0);
        for attempt in 0..self.grid.max_probes {
            candidate = self.grid.candidate(workspace.as_str(), attempt);
            let taken = match self.registry.conflict(candidate, workspace).await {
                Ok(taken) => taken,
                Err(e) => {
                    warn!(workspace = %workspace, error = %e, "registry unreadable, using hashed port");
                    return BasePort {
                        port: candidate,
                        probes: attempt,
                        exhausted: false,
                    };
                }
            };
            if !taken {
                return BasePort {
                    port: candidate,
                    probes: attempt,
                    exhausted: false,
                };
            }
            debug!(workspace = %workspace, candidate, attempt, "bucket held by a live workspace");
        }

        warn!(
            workspace = %workspace,
            port = candidate,
            max_probes = self.grid.max_probes,
            "no free bucket after probing, using last candidate"
        );
        BasePort {
            port: candidate,
            probes: self.grid.max_probes,
            exhausted: true,
        }
    }

    /// Choose a base port and claim it. A failed claim is logged, never fatal.
    pub async fn generate(
        &self,
        workspace: &WorkspaceName,
        project: &str,
        project_dir: &Path,
    ) -> BasePort {
        let base = self.resolve(workspace, project).await;
        self.claim(base.port, workspace, project_dir);
        base
    }

    /// Best-effort claim of `port`. Returns whether the registry took it.
    pub fn claim(&self, port: u16, workspace: &WorkspaceName, project_dir: &Path) -> bool {
        match self.registry.claim(port, workspace, project_dir) {
            Ok(_) => true,
            Err(e) => {
                warn!(workspace = %workspace, base_port = port, error = %e, "registry claim failed");
                false
            }
        }
    }
}

#[cfg(test)]
#[path = "generator_tests.rs"]
mod tests;
