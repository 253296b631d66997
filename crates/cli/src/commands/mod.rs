// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI command implementations

pub mod ports;
pub mod process;
pub mod registry;
pub mod setup;
