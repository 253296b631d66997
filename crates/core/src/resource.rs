// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resources that consume host ports.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Placeholder substituted with the resolved port in dev-server commands.
pub const PORT_PLACEHOLDER: &str = "{port}";

/// A container-backed resource requesting a block of contiguous host ports.
///
/// When `container_ports` is empty the host ports are keyed by ordinal
/// (`0..container_port_count`) instead of by container port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSpec {
    pub name: String,
    pub container_port_count: u16,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub container_ports: Vec<u16>,
}

impl ResourceSpec {
    pub fn new(name: impl Into<String>, container_port_count: u16) -> Self {
        Self {
            name: name.into(),
            container_port_count,
            container_ports: Vec::new(),
        }
    }

    /// A resource whose container ports are known; the count follows the list.
    pub fn with_container_ports(name: impl Into<String>, container_ports: Vec<u16>) -> Self {
        Self {
            name: name.into(),
            container_port_count: u16::try_from(container_ports.len()).unwrap_or(u16::MAX),
            container_ports,
        }
    }

    /// Keys of the host-port mapping, in block order.
    pub fn mapping_keys(&self) -> Vec<u16> {
        if self.container_ports.is_empty() {
            (0..self.container_port_count).collect()
        } else {
            self.container_ports.clone()
        }
    }
}

/// A supervised dev-server process pinned at a fixed offset from the base port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DevServerSpec {
    pub name: String,
    /// Working directory, relative to the workspace root or absolute.
    pub directory: PathBuf,
    /// Command template; every [`PORT_PLACEHOLDER`] is replaced by the port.
    pub command: String,
    pub offset: u16,
}

impl DevServerSpec {
    pub fn new(
        name: impl Into<String>,
        directory: impl Into<PathBuf>,
        command: impl Into<String>,
        offset: u16,
    ) -> Self {
        Self {
            name: name.into(),
            directory: directory.into(),
            command: command.into(),
            offset,
        }
    }

    pub fn render_command(&self, port: u16) -> String {
        self.command.replace(PORT_PLACEHOLDER, &port.to_string())
    }
}

#[cfg(test)]
#[path = "resource_tests.rs"]
mod tests;
