// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workspace setup: base port, claim, allocation, conflict check.

use crate::conflict::{ConflictChecker, ConflictReport, Tolerance};
use crate::generator::{BasePort, PortGenerator};
use crate::registry::ClaimRegistry;
use berth_adapters::{ContainerRuntime, PortProbe, ProcessAdapter};
use berth_core::{
    allocate, AllocationError, Clock, DevServerSpec, GridError, PortAllocation, PortGrid,
    PortOverlap, ResourceSpec, WorkspaceName,
};
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum SetupError {
    #[error("invalid port grid: {0}")]
    Grid(#[from] GridError),
    #[error("invalid resources: {0}")]
    Allocation(#[from] AllocationError),
}

/// Which workspace we are and where it lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceContext {
    pub name: WorkspaceName,
    pub project: String,
    pub root: PathBuf,
}

impl WorkspaceContext {
    pub fn is_main(&self) -> bool {
        PortGrid::is_main(self.name.as_str(), &self.project)
    }
}

/// Ordered resources plus the grid they are placed on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourcePlan {
    pub grid: PortGrid,
    pub docker: Vec<ResourceSpec>,
    pub docker_extra: Vec<ResourceSpec>,
    pub dev_servers: Vec<DevServerSpec>,
}

impl ResourcePlan {
    pub fn allocate(&self, base_port: u16) -> Result<PortAllocation, AllocationError> {
        allocate(base_port, &self.docker, &self.docker_extra, &self.dev_servers)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SetupOutcome {
    pub base: BasePort,
    pub claimed: bool,
    pub allocation: PortAllocation,
    pub overlaps: Vec<PortOverlap>,
    pub conflicts: ConflictReport,
}

/// Compute the allocation without touching the registry.
pub async fn resolve_ports<P, C, K>(
    ctx: &WorkspaceContext,
    plan: &ResourcePlan,
    registry: &ClaimRegistry<P, C, K>,
) -> Result<(BasePort, PortAllocation), SetupError>
where
    P: ProcessAdapter,
    C: ContainerRuntime,
    K: Clock,
{
    plan.grid.validate()?;
    let base = PortGenerator::new(plan.grid, registry)
        .resolve(&ctx.name, &ctx.project)
        .await;
    let allocation = plan.allocate(base.port)?;
    Ok((base, allocation))
}

/// The allocation setup last settled on: the workspace's own claim when it
/// has one, otherwise a fresh resolution.
pub async fn current_ports<P, C, K>(
    ctx: &WorkspaceContext,
    plan: &ResourcePlan,
    registry: &ClaimRegistry<P, C, K>,
) -> Result<(BasePort, PortAllocation), SetupError>
where
    P: ProcessAdapter,
    C: ContainerRuntime,
    K: Clock,
{
    let own = match registry.file().read() {
        Ok(records) => records.into_iter().find(|r| r.workspace == ctx.name),
        Err(e) => {
            warn!(error = %e, "registry unreadable, resolving from scratch");
            None
        }
    };
    match own {
        Some(record) => {
            plan.grid.validate()?;
            let base = BasePort {
                port: record.base_port,
                probes: 0,
                exhausted: false,
            };
            Ok((base, plan.allocate(record.base_port)?))
        }
        None => resolve_ports(ctx, plan, registry).await,
    }
}

/// Full setup. Fatal misconfiguration fails before anything is claimed;
/// conflicts are reported, not raised.
pub async fn setup<P, C, N, K>(
    ctx: &WorkspaceContext,
    plan: &ResourcePlan,
    registry: &ClaimRegistry<P, C, K>,
    checker: &ConflictChecker<P, C, N>,
    tolerance: &Tolerance,
) -> Result<SetupOutcome, SetupError>
where
    P: ProcessAdapter,
    C: ContainerRuntime,
    N: PortProbe,
    K: Clock,
{
    let (base, allocation) = resolve_ports(ctx, plan, registry).await?;
    let claimed = PortGenerator::new(plan.grid, registry).claim(base.port, &ctx.name, &ctx.root);

    let overlaps = allocation.overlaps();
    for overlap in &overlaps {
        warn!(
            port = overlap.port,
            first = overlap.first,
            second = overlap.second,
            "resources share a host port"
        );
    }

    let claims = match registry.live_claims().await {
        Ok(claims) => claims,
        Err(e) => {
            warn!(error = %e, "registry unreadable, conflicts will not name workspaces");
            Vec::new()
        }
    };
    let conflicts = checker
        .clone()
        .with_claims(claims, plan.grid.spacing)
        .check_all(&allocation, tolerance)
        .await;

    Ok(SetupOutcome {
        base,
        claimed,
        allocation,
        overlaps,
        conflicts,
    })
}

#[cfg(test)]
#[path = "setup_tests.rs"]
mod tests;
