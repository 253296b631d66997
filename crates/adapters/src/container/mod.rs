// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Container runtime adapters
//!
//! berth does not start or stop containers. It only asks which are running
//! and which host ports they publish, to judge workspace liveness and to
//! see port bindings that bypass host-visible listeners.

mod docker;
mod host;
mod noop;

pub use docker::{parse_published_ports, DockerRuntime};
pub use host::HostContainerRuntime;
pub use noop::NoOpContainerRuntime;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{ContainerCall, FakeContainerRuntime};

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

/// Errors from container runtime queries
#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("container runtime unavailable: {0}")]
    Unavailable(String),
    #[error("container query failed: {0}")]
    CommandFailed(String),
}

/// A running container and the host ports it publishes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContainerInfo {
    pub name: String,
    pub host_ports: Vec<u16>,
}

impl ContainerInfo {
    pub fn new(name: impl Into<String>, host_ports: Vec<u16>) -> Self {
        Self {
            name: name.into(),
            host_ports,
        }
    }

    pub fn publishes(&self, port: u16) -> bool {
        self.host_ports.contains(&port)
    }
}

/// Read-only view of the container runtime
#[async_trait]
pub trait ContainerRuntime: Clone + Send + Sync + 'static {
    /// Every running container.
    async fn running(&self) -> Result<Vec<ContainerInfo>, ContainerError>;
}
