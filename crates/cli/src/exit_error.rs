// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::fmt;

/// Exit code for unresolved port conflicts
pub const CONFLICT_EXIT_CODE: i32 = 2;

/// Error carrying the process exit code `main` should use.
#[derive(Debug)]
pub struct ExitError {
    pub code: i32,
    pub message: String,
}

impl ExitError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn conflicts(count: usize) -> Self {
        Self::new(
            CONFLICT_EXIT_CODE,
            format!("{count} port conflict(s) unresolved"),
        )
    }
}

impl fmt::Display for ExitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ExitError {}
