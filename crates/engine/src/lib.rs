// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! berth engine: port arbitration and process supervision

mod conflict;
pub mod env;
mod generator;
mod kill_tree;
mod liveness;
pub mod paths;
mod registry;
mod setup;
mod supervisor;

pub use conflict::{ConflictChecker, ConflictReport, PortConflict, PortHolder, Tolerance};
pub use generator::{BasePort, PortGenerator};
pub use kill_tree::{kill_tree, process_tree, signal_tree, KillOutcome};
pub use liveness::LivenessOracle;
pub use registry::{ClaimError, ClaimRegistry, ClaimStatus, CleanReport};
pub use setup::{
    current_ports, resolve_ports, setup, ResourcePlan, SetupError, SetupOutcome, WorkspaceContext,
};
pub use supervisor::{
    ProcessState, ProcessStatus, StartRequest, Stopped, Supervisor, SupervisorError,
};
