// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `berth setup` - claim a base port and check the allocation

use std::io::{BufRead, IsTerminal, Write};

use anyhow::Result;
use berth_engine::{
    kill_tree, ConflictReport, PortConflict, PortHolder, SetupOutcome, Tolerance,
};
use clap::Args;
use serde::Serialize;

use crate::color;
use crate::commands::ports::allocation_table;
use crate::exit_error::ExitError;
use crate::host::Host;
use crate::manifest::Project;
use crate::output::{print_json, OutputFormat};

#[derive(Args)]
pub struct SetupArgs {
    /// Kill processes holding allocated ports without asking
    #[arg(long)]
    pub kill_conflicts: bool,
}

#[derive(Serialize)]
struct SetupReport<'a> {
    workspace: &'a str,
    #[serde(flatten)]
    outcome: &'a SetupOutcome,
}

/// Tolerance for this workspace: its own containers and supervised trees.
pub async fn own_tolerance(host: &Host, project: &Project) -> Tolerance {
    let owned = host.supervisor(&project.ctx.root).owned_pids().await;
    Tolerance::workspace(project.ctx.name.clone()).with_pids(owned)
}

/// Claim, allocate and check; the shared first half of setup/start/run.
pub async fn prepare(host: &Host, project: &Project) -> Result<SetupOutcome> {
    let tolerance = own_tolerance(host, project).await;
    let outcome = berth_engine::setup(
        &project.ctx,
        &project.plan,
        &host.registry(),
        &host.checker(),
        &tolerance,
    )
    .await?;
    Ok(outcome)
}

pub async fn handle(args: SetupArgs, host: &Host, project: &Project, format: OutputFormat) -> Result<()> {
    let mut outcome = prepare(host, project).await?;

    if !outcome.conflicts.is_ok() && should_kill(&args, &outcome.conflicts, format)? {
        kill_process_holders(host, &outcome.conflicts).await;
        outcome.conflicts = recheck(host, project, &outcome).await;
    }

    match format {
        OutputFormat::Text => print_outcome(project, &outcome),
        OutputFormat::Json => print_json(&SetupReport {
            workspace: project.ctx.name.as_str(),
            outcome: &outcome,
        })?,
    }

    if outcome.conflicts.is_ok() {
        Ok(())
    } else {
        Err(ExitError::conflicts(outcome.conflicts.conflicts.len()).into())
    }
}

fn print_outcome(project: &Project, outcome: &SetupOutcome) {
    let base = &outcome.base;
    let mut line = format!(
        "{} {}  base port {}",
        color::header("Workspace:"),
        project.ctx.name,
        base.port
    );
    if base.probes > 0 {
        line.push_str(&format!(" (probed {} bucket(s))", base.probes));
    }
    if base.exhausted {
        line.push_str(" (probe limit reached)");
    }
    if !outcome.claimed {
        line.push_str(&color::muted(" (unclaimed)"));
    }
    println!("{line}");
    println!();
    allocation_table(&outcome.allocation).print();

    for overlap in &outcome.overlaps {
        println!(
            "\n{} port {} is assigned to both {} and {}",
            color::status("conflict"),
            overlap.port,
            overlap.first,
            overlap.second
        );
    }
    print_conflicts(&outcome.conflicts);
}

pub fn print_conflicts(report: &ConflictReport) {
    if report.is_ok() {
        return;
    }
    println!();
    for conflict in &report.conflicts {
        println!("{} {conflict}", color::status("conflict"));
        println!("  {}", color::muted(&conflict.holder.hint()));
    }
}

fn process_holders(report: &ConflictReport) -> Vec<&PortConflict> {
    report
        .conflicts
        .iter()
        .filter(|c| matches!(c.holder, PortHolder::Process { .. }))
        .collect()
}

fn should_kill(args: &SetupArgs, report: &ConflictReport, format: OutputFormat) -> Result<bool> {
    if args.kill_conflicts {
        return Ok(true);
    }
    let holders = process_holders(report);
    if holders.is_empty() || format == OutputFormat::Json || !std::io::stdin().is_terminal() {
        return Ok(false);
    }
    print_conflicts(report);
    print!("\nKill {} conflicting process(es)? [y/N] ", holders.len());
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(is_yes(&answer))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

async fn kill_process_holders(host: &Host, report: &ConflictReport) {
    let grace = berth_engine::env::stop_grace();
    let mut killed = std::collections::BTreeSet::new();
    for conflict in process_holders(report) {
        if let PortHolder::Process { pid, .. } = conflict.holder {
            if killed.insert(pid) {
                let outcome = kill_tree(host.processes(), pid, grace).await;
                tracing::info!(pid, port = conflict.port, tree = outcome.tree.len(), "killed port holder");
            }
        }
    }
}

async fn recheck(host: &Host, project: &Project, outcome: &SetupOutcome) -> ConflictReport {
    let claims = match host.registry().live_claims().await {
        Ok(claims) => claims,
        Err(e) => {
            tracing::warn!(error = %e, "registry unreadable during recheck");
            Vec::new()
        }
    };
    let tolerance = own_tolerance(host, project).await;
    host.checker()
        .with_claims(claims, project.plan.grid.spacing)
        .check_all(&outcome.allocation, &tolerance)
        .await
}

#[cfg(test)]
#[path = "setup_tests.rs"]
mod tests;
