// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `berth registry` - inspect and maintain the shared claim registry

use anyhow::Result;
use berth_core::WorkspaceName;
use berth_engine::ClaimStatus;
use clap::{Args, Subcommand};

use crate::host::Host;
use crate::manifest::Project;
use crate::output::{format_age, print_json, OutputFormat};
use crate::table::{Column, Table};

#[derive(Args)]
pub struct RegistryArgs {
    #[command(subcommand)]
    pub command: RegistryCommand,
}

#[derive(Subcommand)]
pub enum RegistryCommand {
    /// List every claim with its liveness
    List,
    /// Remove claims whose workspace is no longer running
    Clean,
    /// Drop a workspace's claim (default: the current workspace)
    Release {
        /// Workspace name
        workspace: Option<String>,
    },
}

impl RegistryCommand {
    /// Whether the command needs the current workspace's manifest.
    pub fn needs_project(&self) -> bool {
        matches!(self, RegistryCommand::Release { workspace: None })
    }
}

pub async fn handle(
    command: RegistryCommand,
    host: &Host,
    project: Option<&Project>,
    format: OutputFormat,
) -> Result<()> {
    let registry = host.registry();
    match command {
        RegistryCommand::List => {
            let claims = registry.list().await?;
            match format {
                OutputFormat::Text => print_claims(&claims),
                OutputFormat::Json => print_json(&claims)?,
            }
        }
        RegistryCommand::Clean => {
            let report = registry.clean().await?;
            match format {
                OutputFormat::Text => {
                    for record in &report.removed {
                        println!(
                            "Removed {} (port {}, {})",
                            record.workspace,
                            record.base_port,
                            record.project_dir.display()
                        );
                    }
                    println!(
                        "{} removed, {} kept",
                        report.removed.len(),
                        report.kept
                    );
                }
                OutputFormat::Json => print_json(&report)?,
            }
        }
        RegistryCommand::Release { workspace } => {
            let name = match (workspace, project) {
                (Some(raw), _) => WorkspaceName::new(raw)?,
                (None, Some(project)) => project.ctx.name.clone(),
                (None, None) => anyhow::bail!("no workspace given and no berth.toml found"),
            };
            let released = registry.release(&name)?;
            match format {
                OutputFormat::Text if released => println!("Released claim for {name}"),
                OutputFormat::Text => println!("No claim for {name}"),
                OutputFormat::Json => print_json(&serde_json::json!({
                    "workspace": name,
                    "released": released,
                }))?,
            }
        }
    }
    Ok(())
}

pub(crate) fn claims_table(claims: &[ClaimStatus]) -> Table {
    let mut table = Table::new(vec![
        Column::right("PORT"),
        Column::left("WORKSPACE"),
        Column::right("PID"),
        Column::left("AGE"),
        Column::status("STATE"),
        Column::muted("DIRECTORY"),
    ]);
    for claim in claims {
        let record = &claim.record;
        table.row(vec![
            record.base_port.to_string(),
            record.workspace.to_string(),
            record.owner_pid.to_string(),
            format_age(record.claimed_at),
            if claim.alive { "alive" } else { "dead" }.to_string(),
            record.project_dir.display().to_string(),
        ]);
    }
    table
}

fn print_claims(claims: &[ClaimStatus]) {
    let table = claims_table(claims);
    if table.is_empty() {
        println!("No claims");
    } else {
        table.print();
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
