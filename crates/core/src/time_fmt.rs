// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Human-readable claim ages for `berth registry list`.

/// Format seconds as a short duration: `"5s"`, `"2m"`, `"1h30m"`, `"3d"`.
pub fn format_elapsed(secs: u64) -> String {
    match secs {
        0..=59 => format!("{secs}s"),
        60..=3599 => format!("{}m", secs / 60),
        3600..=86399 => match (secs / 3600, (secs % 3600) / 60) {
            (h, 0) => format!("{h}h"),
            (h, m) => format!("{h}h{m}m"),
        },
        _ => format!("{}d", secs / 86400),
    }
}

/// Age of an epoch-seconds timestamp relative to `now`; `"-"` when unset.
///
/// Timestamps in the future (clock skew between workspaces) read as `"0s"`.
pub fn format_age(now: u64, then: u64) -> String {
    if then == 0 {
        return "-".to_string();
    }
    format_elapsed(now.saturating_sub(then))
}

#[cfg(test)]
#[path = "time_fmt_tests.rs"]
mod tests;
