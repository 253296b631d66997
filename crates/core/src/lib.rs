// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! berth-core: port model shared by every berth crate.
//!
//! Nothing in this crate touches the filesystem, the network or child
//! processes. It owns the identities, the registry line codec, the hashed
//! port grid and the deterministic allocator.

pub mod allocation;
pub mod claim;
pub mod clock;
pub mod grid;
pub mod resource;
pub mod time_fmt;
pub mod workspace;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use allocation::{
    allocate, validate_name, AllocatedResource, AllocationError, PortAllocation, PortOverlap, ResourceKind,
    ResourcePorts,
};
pub use claim::{ClaimParseError, ClaimRecord, FIELD_DELIMITER};
pub use clock::{Clock, SystemClock};
pub use grid::{GridError, PortGrid};
pub use resource::{DevServerSpec, ResourceSpec, PORT_PLACEHOLDER};
pub use time_fmt::{format_age, format_elapsed};
pub use workspace::{compose_project_name, NameError, WorkspaceName};

#[cfg(any(test, feature = "test-support"))]
pub use clock::FakeClock;
