// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! berth - port arbitration for git worktrees

mod color;
mod commands;
mod env;
mod exit_error;
mod host;
mod manifest;
mod output;
mod table;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use commands::{ports, process, registry, setup};
use output::OutputFormat;

use crate::host::Host;
use crate::manifest::Project;

#[derive(Parser)]
#[command(
    name = "berth",
    version,
    about = "Berth - deterministic ports for parallel workspaces"
)]
struct Cli {
    /// Output format
    #[arg(
        short = 'o',
        long = "output",
        value_enum,
        default_value_t,
        global = true
    )]
    output: OutputFormat,

    /// Treat the current checkout as this workspace name
    #[arg(long, global = true, value_name = "NAME")]
    workspace: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Claim a base port and check every allocated port
    Setup(setup::SetupArgs),
    /// Show the port allocation
    Ports(ports::PortsArgs),
    /// Print one resource's port
    Port(ports::PortArgs),
    /// Start dev servers in the background
    Start(process::StartArgs),
    /// Start dev servers and stop them on Ctrl-C
    Run(process::StartArgs),
    /// Stop supervised dev servers
    Stop(process::StopArgs),
    /// Show the claim and supervised processes
    Status,
    /// Shared claim registry
    Registry(registry::RegistryArgs),
}

fn cli_command() -> clap::Command {
    Cli::command()
}

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(e) = run().await {
        let code = e
            .downcast_ref::<exit_error::ExitError>()
            .map_or(1, |c| c.code);
        let msg = format_error(&e);
        if !msg.is_empty() {
            eprintln!("Error: {}", msg);
        }
        std::process::exit(code);
    }
}

/// Log to stderr so stdout stays parseable (`$(berth port web)`, `-o json`).
fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_new(env::log_filter()).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}

/// Format an anyhow error, deduplicating the chain.
///
/// If the top-level Display already contains the source error text, we skip
/// the "Caused by" chain. Otherwise we render the full chain so context
/// isn't lost.
fn format_error(err: &anyhow::Error) -> String {
    let top = err.to_string();

    let chain_redundant = err
        .chain()
        .skip(1)
        .all(|cause| top.contains(&cause.to_string()));

    if chain_redundant {
        return top;
    }

    let mut buf = top;
    for (i, cause) in err.chain().skip(1).enumerate() {
        buf.push_str(&format!("\n\nCaused by:\n    {}: {}", i, cause));
    }
    buf
}

fn discover(workspace: Option<&str>) -> Result<Project> {
    let cwd = std::env::current_dir()?;
    Ok(Project::discover(&cwd, workspace)?)
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let format = cli.output;

    let Some(command) = cli.command else {
        cli_command().print_help()?;
        println!();
        return Ok(());
    };

    let host = Host::from_env()?;
    let workspace = cli.workspace.as_deref();

    match command {
        Commands::Setup(args) => {
            setup::handle(args, &host, &discover(workspace)?, format).await?
        }
        Commands::Ports(args) => ports::ports(args, &host, &discover(workspace)?, format).await?,
        Commands::Port(args) => ports::port(args, &host, &discover(workspace)?, format).await?,
        Commands::Start(args) => {
            process::start(args, &host, &discover(workspace)?, format).await?
        }
        Commands::Run(args) => process::run(args, &host, &discover(workspace)?, format).await?,
        Commands::Stop(args) => process::stop(args, &host, &discover(workspace)?, format).await?,
        Commands::Status => process::status(&host, &discover(workspace)?, format).await?,
        Commands::Registry(args) => {
            let project = if args.command.needs_project() {
                Some(discover(workspace)?)
            } else {
                None
            };
            registry::handle(args.command, &host, project.as_ref(), format).await?
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
