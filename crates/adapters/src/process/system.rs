// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process adapter backed by `kill`, `ps`, `pgrep`, and `lsof`

use super::{PortListener, ProcessAdapter, ProcessError, Signal, SpawnRequest};
use crate::subprocess::{run_with_timeout, PROCESS_QUERY_TIMEOUT};
use async_trait::async_trait;
use std::fs::OpenOptions;
use std::os::unix::process::CommandExt;
use std::process::Stdio;
use tokio::process::Command;

/// The real process table
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemProcesses;

impl SystemProcesses {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProcessAdapter for SystemProcesses {
    async fn is_alive(&self, pid: u32) -> bool {
        // kill -0 on pid 0 would probe our own process group
        if pid == 0 {
            return false;
        }

        let mut probe = Command::new("kill");
        probe.args(["-0", &pid.to_string()]);
        let exists = run_with_timeout(probe, PROCESS_QUERY_TIMEOUT, "kill -0")
            .await
            .map(|o| o.status.success())
            .unwrap_or(false);
        if !exists {
            return false;
        }

        // Zombies still answer kill -0
        let mut ps = Command::new("ps");
        ps.args(["-o", "stat=", "-p", &pid.to_string()]);
        match run_with_timeout(ps, PROCESS_QUERY_TIMEOUT, "ps").await {
            Ok(output) if output.status.success() => {
                let stat = String::from_utf8_lossy(&output.stdout);
                !stat.trim_start().starts_with('Z')
            }
            Ok(_) => false,
            Err(e) => {
                tracing::debug!(pid, error = %e, "ps unavailable, trusting kill -0");
                true
            }
        }
    }

    async fn children(&self, pid: u32) -> Result<Vec<u32>, ProcessError> {
        let mut cmd = Command::new("pgrep");
        cmd.args(["-P", &pid.to_string()]);
        let output = run_with_timeout(cmd, PROCESS_QUERY_TIMEOUT, "pgrep -P")
            .await
            .map_err(ProcessError::QueryFailed)?;

        // pgrep exits 1 when nothing matched
        match output.status.code() {
            Some(0) | Some(1) => {}
            _ => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                return Err(ProcessError::QueryFailed(stderr.trim().to_string()));
            }
        }

        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .filter_map(|line| line.trim().parse::<u32>().ok())
            .collect())
    }

    async fn signal(&self, pid: u32, signal: Signal) -> Result<(), ProcessError> {
        if pid == 0 {
            return Err(ProcessError::NotFound(pid));
        }

        let mut cmd = Command::new("kill");
        cmd.args([signal.as_arg(), &pid.to_string()]);
        let output = run_with_timeout(cmd, PROCESS_QUERY_TIMEOUT, "kill")
            .await
            .map_err(|message| ProcessError::SignalFailed { pid, message })?;

        if output.status.success() {
            return Ok(());
        }
        if !self.is_alive(pid).await {
            return Err(ProcessError::NotFound(pid));
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        Err(ProcessError::SignalFailed {
            pid,
            message: stderr.trim().to_string(),
        })
    }

    async fn listener(&self, port: u16) -> Result<Option<PortListener>, ProcessError> {
        let mut cmd = Command::new("lsof");
        cmd.args([
            "-nP",
            &format!("-iTCP:{}", port),
            "-sTCP:LISTEN",
            "-Fpc",
        ]);
        let output = run_with_timeout(cmd, PROCESS_QUERY_TIMEOUT, "lsof")
            .await
            .map_err(ProcessError::QueryFailed)?;

        // lsof exits 1 when nothing is listening
        Ok(parse_lsof_fields(&String::from_utf8_lossy(&output.stdout)))
    }

    async fn spawn(&self, request: &SpawnRequest) -> Result<u32, ProcessError> {
        let spawn_err = |message: String| ProcessError::SpawnFailed {
            command: request.command.clone(),
            message,
        };

        if let Some(parent) = request.log_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| spawn_err(e.to_string()))?;
        }
        let log = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&request.log_path)
            .map_err(|e| spawn_err(format!("{}: {}", request.log_path.display(), e)))?;
        let log_err = log.try_clone().map_err(|e| spawn_err(e.to_string()))?;

        // std Command: the child must outlive this invocation, so no tokio reaper
        let mut cmd = std::process::Command::new("sh");
        cmd.arg("-c")
            .arg(&request.command)
            .current_dir(&request.cwd)
            .envs(request.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::from(log))
            .stderr(Stdio::from(log_err))
            .process_group(0);

        let child = cmd.spawn().map_err(|e| spawn_err(e.to_string()))?;
        Ok(child.id())
    }
}

/// First listener in `lsof -F pc` output (`p<pid>` then `c<command>` lines).
pub fn parse_lsof_fields(output: &str) -> Option<PortListener> {
    let mut pid = None;
    let mut command = String::new();
    for line in output.lines() {
        if let Some(value) = line.strip_prefix('p') {
            if pid.is_some() {
                break;
            }
            pid = value.trim().parse::<u32>().ok();
        } else if let Some(value) = line.strip_prefix('c') {
            if pid.is_some() && command.is_empty() {
                command = value.to_string();
            }
        }
    }
    pid.map(|pid| PortListener { pid, command })
}

#[cfg(test)]
#[path = "system_tests.rs"]
mod tests;
