// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Adapters for external I/O: container runtime, OS processes, port probes

pub mod container;
mod env;
pub mod net;
pub mod process;
pub mod subprocess;
pub mod traced;

pub use container::{
    ContainerError, ContainerInfo, ContainerRuntime, DockerRuntime, HostContainerRuntime,
    NoOpContainerRuntime,
};
pub use net::{PortProbe, SystemPortProbe};
pub use process::{
    PortListener, ProcessAdapter, ProcessError, Signal, SpawnRequest, SystemProcesses,
};
pub use traced::{TracedContainers, TracedProcesses};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use container::{ContainerCall, FakeContainerRuntime};
#[cfg(any(test, feature = "test-support"))]
pub use net::FakePortProbe;
#[cfg(any(test, feature = "test-support"))]
pub use process::{FakeProcess, FakeProcessAdapter, ProcessCall};
