// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `berth ports` / `berth port` - show the workspace's allocation

use anyhow::Result;
use berth_core::{PortAllocation, ResourceKind};
use clap::Args;
use serde::Serialize;

use crate::exit_error::ExitError;
use crate::host::Host;
use crate::manifest::Project;
use crate::output::{env_lines, print_json, OutputFormat};
use crate::table::{Column, Table};

#[derive(Args)]
pub struct PortsArgs {
    /// Print `NAME_PORT=value` lines instead of a table
    #[arg(long)]
    pub env: bool,
}

#[derive(Args)]
pub struct PortArgs {
    /// Resource name from berth.toml
    pub name: String,
}

#[derive(Serialize)]
struct PortsReport<'a> {
    workspace: &'a str,
    base_port: u16,
    allocation: &'a PortAllocation,
    env: Vec<(String, String)>,
}

pub async fn ports(args: PortsArgs, host: &Host, project: &Project, format: OutputFormat) -> Result<()> {
    let (base, allocation) =
        berth_engine::current_ports(&project.ctx, &project.plan, &host.registry()).await?;

    if args.env {
        print!("{}", env_lines(&allocation.env_vars()));
        return Ok(());
    }
    match format {
        OutputFormat::Text => allocation_table(&allocation).print(),
        OutputFormat::Json => print_json(&PortsReport {
            workspace: project.ctx.name.as_str(),
            base_port: base.port,
            env: allocation.env_vars(),
            allocation: &allocation,
        })?,
    }
    Ok(())
}

/// Primary port of one resource, for `$(berth port web)`.
pub async fn port(args: PortArgs, host: &Host, project: &Project, format: OutputFormat) -> Result<()> {
    let (_, allocation) =
        berth_engine::current_ports(&project.ctx, &project.plan, &host.registry()).await?;
    let port = allocation
        .resolve_port(&args.name)
        .ok_or_else(|| ExitError::new(1, format!("unknown resource: {}", args.name)))?;
    match format {
        OutputFormat::Text => println!("{port}"),
        OutputFormat::Json => print_json(&serde_json::json!({ "name": args.name, "port": port }))?,
    }
    Ok(())
}

fn kind_label(kind: ResourceKind) -> &'static str {
    match kind {
        ResourceKind::Docker => "docker",
        ResourceKind::DockerExtra => "docker-extra",
        ResourceKind::DevServer => "dev-server",
    }
}

/// One row per resource; multi-port resources list their container mapping.
pub fn allocation_table(allocation: &PortAllocation) -> Table {
    let mut table = Table::new(vec![
        Column::left("RESOURCE"),
        Column::muted("KIND"),
        Column::right("PORT"),
        Column::left("MAPPING"),
    ]);
    for resource in allocation.resources() {
        let mapping = if resource.ports.host_port_by_container_port.len() > 1 {
            resource
                .ports
                .host_port_by_container_port
                .iter()
                .map(|(container, host)| format!("{host}->{container}"))
                .collect::<Vec<_>>()
                .join(" ")
        } else {
            String::new()
        };
        table.row(vec![
            resource.name.clone(),
            kind_label(resource.kind).to_string(),
            resource.ports.primary.to_string(),
            mapping,
        ]);
    }
    table
}

#[cfg(test)]
#[path = "ports_tests.rs"]
mod tests;
