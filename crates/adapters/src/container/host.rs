// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Container runtime chosen from the environment

use super::{ContainerError, ContainerInfo, ContainerRuntime, DockerRuntime, NoOpContainerRuntime};
use async_trait::async_trait;

/// Docker unless `BERTH_NO_DOCKER` is set
#[derive(Clone, Debug)]
pub enum HostContainerRuntime {
    Docker(DockerRuntime),
    Disabled(NoOpContainerRuntime),
}

impl HostContainerRuntime {
    pub fn from_env() -> Self {
        if crate::env::docker_disabled() {
            HostContainerRuntime::Disabled(NoOpContainerRuntime::new())
        } else {
            HostContainerRuntime::Docker(DockerRuntime::default())
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, HostContainerRuntime::Docker(_))
    }
}

#[async_trait]
impl ContainerRuntime for HostContainerRuntime {
    async fn running(&self) -> Result<Vec<ContainerInfo>, ContainerError> {
        match self {
            HostContainerRuntime::Docker(docker) => docker.running().await,
            HostContainerRuntime::Disabled(noop) => noop.running().await,
        }
    }
}

#[cfg(test)]
#[path = "host_tests.rs"]
mod tests;
