// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Storage layer for berth
//!
//! Two files live here: the machine-wide claim registry (guarded by a
//! directory lock) and the per-workspace record of supervised processes.

mod atomic;
mod lock;
mod pid_file;
mod registry;

pub use atomic::write_atomic;
pub use lock::{DirLock, LockConfig, LockError, LockGuard};
pub use pid_file::{PidFile, PidFileError, ProcessRecord};
pub use registry::{RegistryError, RegistryFile};
