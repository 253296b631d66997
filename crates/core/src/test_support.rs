// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test fixtures for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.
#![allow(clippy::panic)]

use crate::{ClaimRecord, DevServerSpec, ResourceSpec, WorkspaceName};

pub fn name(raw: &str) -> WorkspaceName {
    match WorkspaceName::new(raw) {
        Ok(name) => name,
        Err(e) => panic!("invalid fixture workspace name {raw:?}: {e}"),
    }
}

pub fn claim(base_port: u16, workspace: &str, owner_pid: u32) -> ClaimRecord {
    ClaimRecord {
        base_port,
        workspace: name(workspace),
        project_dir: format!("/src/{workspace}").into(),
        claimed_at: 1_000_000,
        owner_pid,
    }
}

pub fn postgres() -> ResourceSpec {
    ResourceSpec::new("postgres", 1)
}

pub fn web_server(offset: u16) -> DevServerSpec {
    DevServerSpec::new("web", "apps/web", "serve --port {port}", offset)
}
