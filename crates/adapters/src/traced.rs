// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrappers for consistent observability

use crate::container::{ContainerError, ContainerInfo, ContainerRuntime};
use crate::process::{PortListener, ProcessAdapter, ProcessError, Signal, SpawnRequest};
use async_trait::async_trait;
use tracing::Instrument;

/// Wrapper that adds tracing to any ContainerRuntime
#[derive(Clone)]
pub struct TracedContainers<C> {
    inner: C,
}

impl<C> TracedContainers<C> {
    pub fn new(inner: C) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<C: ContainerRuntime> ContainerRuntime for TracedContainers<C> {
    async fn running(&self) -> Result<Vec<ContainerInfo>, ContainerError> {
        async {
            let start = std::time::Instant::now();
            let result = self.inner.running().await;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            match &result {
                Ok(list) => tracing::debug!(count = list.len(), elapsed_ms, "listed containers"),
                Err(e) => tracing::warn!(elapsed_ms, error = %e, "container query failed"),
            }
            result
        }
        .instrument(tracing::debug_span!("containers.running"))
        .await
    }
}

/// Wrapper that adds tracing to any ProcessAdapter
#[derive(Clone)]
pub struct TracedProcesses<P> {
    inner: P,
}

impl<P> TracedProcesses<P> {
    pub fn new(inner: P) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<P: ProcessAdapter> ProcessAdapter for TracedProcesses<P> {
    async fn is_alive(&self, pid: u32) -> bool {
        let alive = self.inner.is_alive(pid).await;
        tracing::trace!(pid, alive, "checked");
        alive
    }

    async fn children(&self, pid: u32) -> Result<Vec<u32>, ProcessError> {
        let result = self.inner.children(pid).await;
        if let Err(ref e) = result {
            tracing::warn!(pid, error = %e, "child lookup failed");
        }
        result
    }

    async fn signal(&self, pid: u32, signal: Signal) -> Result<(), ProcessError> {
        let result = self.inner.signal(pid, signal).await;
        tracing::info_span!("process.signal", pid, %signal).in_scope(|| match &result {
            Ok(()) => tracing::info!("signalled"),
            Err(e) => tracing::debug!(error = %e, "signal failed (may be expected)"),
        });
        result
    }

    async fn listener(&self, port: u16) -> Result<Option<PortListener>, ProcessError> {
        let result = self.inner.listener(port).await;
        tracing::debug!(port, listener = ?result.as_ref().ok().and_then(|l| l.as_ref()), "looked up");
        result
    }

    async fn spawn(&self, request: &SpawnRequest) -> Result<u32, ProcessError> {
        async {
            tracing::info!(command = %request.command, env_count = request.env.len(), "starting");
            let start = std::time::Instant::now();
            let result = self.inner.spawn(request).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            match &result {
                Ok(pid) => tracing::info!(pid, elapsed_ms, "process started"),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "spawn failed"),
            }
            result
        }
        .instrument(tracing::info_span!("process.spawn", cwd = %request.cwd.display()))
        .await
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
