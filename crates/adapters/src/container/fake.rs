// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake container runtime for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{ContainerError, ContainerInfo, ContainerRuntime};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;

/// Recorded runtime call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerCall {
    Running,
}

#[derive(Default)]
struct FakeContainerState {
    containers: Vec<ContainerInfo>,
    unavailable: bool,
    calls: Vec<ContainerCall>,
}

/// Fake container runtime for testing
#[derive(Clone, Default)]
pub struct FakeContainerRuntime {
    inner: Arc<Mutex<FakeContainerState>>,
}

impl FakeContainerRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a running container
    pub fn add_container(&self, name: &str, host_ports: &[u16]) {
        self.inner
            .lock()
            .containers
            .push(ContainerInfo::new(name, host_ports.to_vec()));
    }

    /// Stop (remove) a container
    pub fn remove_container(&self, name: &str) {
        self.inner.lock().containers.retain(|c| c.name != name);
    }

    /// Make every query fail as if the runtime were down
    pub fn set_unavailable(&self, unavailable: bool) {
        self.inner.lock().unavailable = unavailable;
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<ContainerCall> {
        self.inner.lock().calls.clone()
    }
}

#[async_trait]
impl ContainerRuntime for FakeContainerRuntime {
    async fn running(&self) -> Result<Vec<ContainerInfo>, ContainerError> {
        let mut inner = self.inner.lock();
        inner.calls.push(ContainerCall::Running);
        if inner.unavailable {
            return Err(ContainerError::Unavailable("fake runtime down".to_string()));
        }
        Ok(inner.containers.clone())
    }
}
