// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `berth start` / `run` / `stop` / `status` - dev server supervision

use std::future::Future;
use std::time::Duration;

use anyhow::Result;
use berth_core::{DevServerSpec, PortAllocation};
use berth_engine::{ProcessStatus, StartRequest, Stopped};
use clap::Args;
use serde::Serialize;
use tokio::signal::unix::{signal, SignalKind};
use tracing::warn;

use crate::commands::setup::{prepare, print_conflicts};
use crate::exit_error::ExitError;
use crate::host::{Host, HostSupervisor};
use crate::manifest::Project;
use crate::output::{print_json, OutputFormat};
use crate::color;
use crate::table::{Column, Table};

/// How often `run` checks whether its processes are still up
const SUPERVISE_POLL: Duration = Duration::from_secs(1);

#[derive(Args)]
pub struct StartArgs {
    /// Dev servers to start (default: all)
    pub names: Vec<String>,
}

#[derive(Args)]
pub struct StopArgs {
    /// Also release this workspace's registry claim
    #[arg(long)]
    pub release: bool,
}

#[derive(Debug, Clone, Serialize)]
struct Started {
    name: String,
    pid: u32,
    port: u16,
    log: String,
}

#[derive(Serialize)]
struct StatusReport<'a> {
    workspace: &'a str,
    base_port: Option<u16>,
    claim_alive: Option<bool>,
    processes: &'a [ProcessStatus],
}

/// Dev servers named in `names`, or all of them.
fn select<'a>(project: &'a Project, names: &[String]) -> Result<Vec<&'a DevServerSpec>> {
    let servers = &project.plan.dev_servers;
    if names.is_empty() {
        return Ok(servers.iter().collect());
    }
    names
        .iter()
        .map(|name| {
            servers.iter().find(|s| &s.name == name).ok_or_else(|| {
                anyhow::Error::from(ExitError::new(1, format!("unknown dev server: {name}")))
            })
        })
        .collect()
}

async fn launch(
    supervisor: &HostSupervisor,
    project: &Project,
    servers: &[&DevServerSpec],
    allocation: &PortAllocation,
) -> Result<Vec<Started>> {
    let env = allocation.env_vars();
    let mut started = Vec::with_capacity(servers.len());
    for spec in servers {
        let Some(port) = allocation.resolve_port(&spec.name) else {
            continue;
        };
        let request =
            StartRequest::dev_server(spec, &project.ctx.root, port).with_env(env.clone());
        let pid = supervisor.start(&request).await?;
        started.push(Started {
            name: spec.name.clone(),
            pid,
            port,
            log: supervisor.log_path(&spec.name).display().to_string(),
        });
    }
    Ok(started)
}

/// Setup, then launch; fails with exit code 2 before spawning anything if
/// an allocated port is held by someone else.
async fn setup_and_launch(
    host: &Host,
    project: &Project,
    names: &[String],
    supervisor: &HostSupervisor,
) -> Result<(u16, Vec<Started>)> {
    let servers = select(project, names)?;
    if servers.is_empty() {
        return Err(ExitError::new(1, "no dev servers declared in berth.toml").into());
    }
    let outcome = prepare(host, project).await?;
    if !outcome.conflicts.is_ok() {
        print_conflicts(&outcome.conflicts);
        return Err(ExitError::conflicts(outcome.conflicts.conflicts.len()).into());
    }
    let started = launch(supervisor, project, &servers, &outcome.allocation).await?;
    Ok((outcome.base.port, started))
}

fn print_started(started: &[Started], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => {
            let mut table = Table::new(vec![
                Column::left("NAME"),
                Column::right("PID"),
                Column::right("PORT"),
                Column::muted("LOG"),
            ]);
            for s in started {
                table.row(vec![
                    s.name.clone(),
                    s.pid.to_string(),
                    s.port.to_string(),
                    s.log.clone(),
                ]);
            }
            table.print();
        }
        OutputFormat::Json => print_json(started)?,
    }
    Ok(())
}

/// Start dev servers in the background and return.
pub async fn start(args: StartArgs, host: &Host, project: &Project, format: OutputFormat) -> Result<()> {
    let supervisor = host.supervisor(&project.ctx.root);
    let (base_port, started) = setup_and_launch(host, project, &args.names, &supervisor).await?;

    // The claim must outlive this invocation; hand it to a dev server.
    if let Some(first) = started.first() {
        if let Err(e) =
            host.registry()
                .claim_as(base_port, &project.ctx.name, &project.ctx.root, first.pid)
        {
            warn!(error = %e, "could not hand the claim to {}", first.name);
        }
    }
    print_started(&started, format)
}

/// Drive `work` unless `interrupted` fires first, in which case `None`.
async fn unless_interrupted<T>(
    work: impl Future<Output = Result<T>>,
    interrupted: impl Future<Output = ()>,
) -> Result<Option<T>> {
    tokio::select! {
        result = work => result.map(Some),
        () = interrupted => Ok(None),
    }
}

/// Start dev servers and stay in the foreground until interrupted.
pub async fn run(args: StartArgs, host: &Host, project: &Project, format: OutputFormat) -> Result<()> {
    let supervisor = host.supervisor(&project.ctx.root);
    // Listen before spawning so Ctrl-C during setup still tears down.
    let mut sigint = signal(SignalKind::interrupt())?;

    let launched = unless_interrupted(
        setup_and_launch(host, project, &args.names, &supervisor),
        async {
            sigint.recv().await;
        },
    )
    .await;
    let started = match launched {
        Ok(Some((_, started))) => started,
        Ok(None) => {
            warn!("interrupted during startup");
            let stopped = supervisor.stop_all().await?;
            if format == OutputFormat::Text {
                print_stopped(&stopped);
            }
            return Ok(());
        }
        Err(e) => {
            if let Err(stop_err) = supervisor.stop_all().await {
                warn!(error = %stop_err, "cleanup after failed start");
            }
            return Err(e);
        }
    };
    print_started(&started, format)?;
    if format == OutputFormat::Text {
        println!("\n{}", color::muted("Press Ctrl-C to stop"));
    }

    let interrupted = async move {
        sigint.recv().await;
    };
    let stopped = supervisor.supervise(interrupted, SUPERVISE_POLL).await?;
    if format == OutputFormat::Text {
        print_stopped(&stopped);
    }
    Ok(())
}

fn stop_result(stopped: &Stopped) -> String {
    match &stopped.outcome {
        None => "already exited".to_string(),
        Some(outcome) if !outcome.survivors.is_empty() => {
            format!("{} survivor(s)", outcome.survivors.len())
        }
        Some(outcome) if !outcome.forced.is_empty() => "killed".to_string(),
        Some(_) => "stopped".to_string(),
    }
}

fn print_stopped(stopped: &[Stopped]) {
    if stopped.is_empty() {
        println!("Nothing running");
        return;
    }
    let mut table = Table::new(vec![
        Column::left("NAME"),
        Column::right("PID"),
        Column::status("RESULT"),
    ]);
    for s in stopped {
        table.row(vec![s.name.clone(), s.pid.to_string(), stop_result(s)]);
    }
    table.print();
}

pub async fn stop(args: StopArgs, host: &Host, project: &Project, format: OutputFormat) -> Result<()> {
    let stopped = host.supervisor(&project.ctx.root).stop_all().await?;
    let released = if args.release {
        host.registry().release(&project.ctx.name)?
    } else {
        false
    };
    match format {
        OutputFormat::Text => {
            print_stopped(&stopped);
            if released {
                println!("Released claim for {}", project.ctx.name);
            }
        }
        OutputFormat::Json => print_json(&serde_json::json!({
            "stopped": stopped,
            "released": released,
        }))?,
    }
    Ok(())
}

pub async fn status(host: &Host, project: &Project, format: OutputFormat) -> Result<()> {
    let processes = host.supervisor(&project.ctx.root).status().await?;
    let claim = host
        .registry()
        .list()
        .await?
        .into_iter()
        .find(|c| c.record.workspace == project.ctx.name);

    match format {
        OutputFormat::Text => {
            match &claim {
                Some(c) => println!(
                    "{} {}  base port {}  {}",
                    color::header("Workspace:"),
                    project.ctx.name,
                    c.record.base_port,
                    color::status(if c.alive { "claimed" } else { "dead" })
                ),
                None => println!(
                    "{} {}  {}",
                    color::header("Workspace:"),
                    project.ctx.name,
                    color::muted("no claim, run `berth setup`")
                ),
            }
            if processes.is_empty() {
                println!("No supervised processes");
                return Ok(());
            }
            println!();
            let mut table = Table::new(vec![
                Column::left("NAME"),
                Column::right("PID"),
                Column::right("PORT"),
                Column::status("STATE"),
            ]);
            for p in &processes {
                let state = if p.running() { "running" } else { "terminated" };
                table.row(vec![
                    p.name.clone(),
                    p.pid.to_string(),
                    p.port.to_string(),
                    state.to_string(),
                ]);
            }
            table.print();
        }
        OutputFormat::Json => print_json(&StatusReport {
            workspace: project.ctx.name.as_str(),
            base_port: claim.as_ref().map(|c| c.record.base_port),
            claim_alive: claim.as_ref().map(|c| c.alive),
            processes: &processes,
        })?,
    }
    Ok(())
}

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;
