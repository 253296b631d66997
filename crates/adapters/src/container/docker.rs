// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Docker CLI adapter

use super::{ContainerError, ContainerInfo, ContainerRuntime};
use crate::subprocess::run_with_timeout;
use async_trait::async_trait;
use std::time::Duration;
use tokio::process::Command;

/// Queries `docker ps` (or a compatible CLI such as podman)
#[derive(Clone, Debug)]
pub struct DockerRuntime {
    binary: String,
    timeout: Duration,
}

impl Default for DockerRuntime {
    fn default() -> Self {
        Self::new(crate::env::docker_binary(), crate::env::docker_timeout())
    }
}

impl DockerRuntime {
    pub fn new(binary: impl Into<String>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            timeout,
        }
    }
}

#[async_trait]
impl ContainerRuntime for DockerRuntime {
    async fn running(&self) -> Result<Vec<ContainerInfo>, ContainerError> {
        let mut cmd = Command::new(&self.binary);
        cmd.args(["ps", "--format", "{{.Names}}\t{{.Ports}}"]);
        let output = run_with_timeout(cmd, self.timeout, "docker ps")
            .await
            .map_err(ContainerError::Unavailable)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ContainerError::CommandFailed(stderr.trim().to_string()));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                let (name, ports) = line.split_once('\t').unwrap_or((line, ""));
                ContainerInfo::new(name.trim(), parse_published_ports(ports))
            })
            .collect())
    }
}

/// Host ports from a `docker ps` Ports column, e.g.
/// `0.0.0.0:5432->5432/tcp, :::5432->5432/tcp, 0.0.0.0:8025-8026->8025-8026/tcp`.
///
/// Unpublished ports (`6379/tcp`) are ignored. Result is sorted and deduped.
pub fn parse_published_ports(column: &str) -> Vec<u16> {
    let mut ports = Vec::new();
    for mapping in column.split(',') {
        let Some((host, _container)) = mapping.trim().split_once("->") else {
            continue;
        };
        let Some((_addr, host_ports)) = host.rsplit_once(':') else {
            continue;
        };
        match host_ports.split_once('-') {
            Some((start, end)) => {
                if let (Ok(start), Ok(end)) = (start.parse::<u16>(), end.parse::<u16>()) {
                    ports.extend(start..=end);
                }
            }
            None => {
                if let Ok(port) = host_ports.parse::<u16>() {
                    ports.push(port);
                }
            }
        }
    }
    ports.sort_unstable();
    ports.dedup();
    ports
}

#[cfg(test)]
#[path = "docker_tests.rs"]
mod tests;
