// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Container runtime for hosts without one

use super::{ContainerError, ContainerInfo, ContainerRuntime};
use async_trait::async_trait;

/// Reports no running containers
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpContainerRuntime;

impl NoOpContainerRuntime {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ContainerRuntime for NoOpContainerRuntime {
    async fn running(&self) -> Result<Vec<ContainerInfo>, ContainerError> {
        Ok(Vec::new())
    }
}
