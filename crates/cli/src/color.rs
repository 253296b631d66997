// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::io::IsTerminal;

mod codes {
    /// Section headers: steel blue
    pub const HEADER: u8 = 74;
    /// Muted / secondary text: dark grey
    pub const MUTED: u8 = 240;
}

const RESET: &str = "\x1b[0m";

/// Priority: `NO_COLOR=1` disables, `COLOR=1` forces, then TTY check.
pub fn should_colorize() -> bool {
    if crate::env::no_color() {
        return false;
    }
    if crate::env::force_color() {
        return true;
    }
    std::io::stdout().is_terminal()
}

fn fg256(code: u8) -> String {
    format!("\x1b[38;5;{code}m")
}

pub fn header(text: &str) -> String {
    if should_colorize() {
        apply_header(text)
    } else {
        text.to_string()
    }
}

pub(crate) fn apply_header(text: &str) -> String {
    format!("{}{}{}", fg256(codes::HEADER), text, RESET)
}

pub fn muted(text: &str) -> String {
    if should_colorize() {
        apply_muted(text)
    } else {
        text.to_string()
    }
}

pub(crate) fn apply_muted(text: &str) -> String {
    format!("{}{}{}", fg256(codes::MUTED), text, RESET)
}

pub fn status(text: &str) -> String {
    if should_colorize() {
        apply_status(text)
    } else {
        text.to_string()
    }
}

/// Green for healthy states, yellow for winding down, red for gone.
pub(crate) fn apply_status(text: &str) -> String {
    let code = match text.trim() {
        "running" | "alive" | "free" | "claimed" => "\x1b[32m",
        "stopped" | "stopping" | "tolerated" => "\x1b[33m",
        "dead" | "terminated" | "conflict" => "\x1b[31m",
        _ => return text.to_string(),
    };
    format!("{code}{text}{RESET}")
}

#[cfg(test)]
#[path = "color_tests.rs"]
mod tests;
