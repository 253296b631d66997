// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Terminating whole process trees.

use berth_adapters::{ProcessAdapter, ProcessError, Signal};
use serde::Serialize;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// What happened to a tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct KillOutcome {
    /// Every pid in the tree, children before parents.
    pub tree: Vec<u32>,
    /// Pids that needed SIGKILL after the grace period.
    pub forced: Vec<u32>,
    /// Pids still alive after SIGKILL.
    pub survivors: Vec<u32>,
}

/// `root` and all its descendants, children before parents.
///
/// The tree is collected before any signal goes out: once a parent dies
/// its children are reparented and can no longer be found from `root`.
pub async fn process_tree<P: ProcessAdapter>(processes: &P, root: u32) -> Vec<u32> {
    let mut order = Vec::new();
    // (pid, children already pushed)
    let mut stack = vec![(root, false)];
    while let Some((pid, expanded)) = stack.pop() {
        if expanded {
            order.push(pid);
            continue;
        }
        stack.push((pid, true));
        match processes.children(pid).await {
            Ok(children) => {
                for child in children.into_iter().rev() {
                    if child != pid && !order.contains(&child) {
                        stack.push((child, false));
                    }
                }
            }
            Err(e) => debug!(pid, error = %e, "cannot list children"),
        }
    }
    order
}

/// Send `signal` to `root` and every descendant, depth-first.
pub async fn signal_tree<P: ProcessAdapter>(
    processes: &P,
    root: u32,
    signal: Signal,
) -> Vec<u32> {
    let tree = process_tree(processes, root).await;
    for pid in &tree {
        send(processes, *pid, signal).await;
    }
    tree
}

/// SIGTERM the tree, wait up to `grace` for it to exit, SIGKILL whatever is
/// left. Failures are logged; the call always completes.
pub async fn kill_tree<P: ProcessAdapter>(processes: &P, root: u32, grace: Duration) -> KillOutcome {
    let tree = signal_tree(processes, root, Signal::Term).await;

    let deadline = Instant::now() + grace;
    let mut alive = still_alive(processes, &tree).await;
    while !alive.is_empty() && Instant::now() < deadline {
        tokio::time::sleep(POLL_INTERVAL.min(grace)).await;
        alive = still_alive(processes, &tree).await;
    }

    for pid in &alive {
        send(processes, *pid, Signal::Kill).await;
    }
    let survivors = if alive.is_empty() {
        Vec::new()
    } else {
        // Give the kernel a moment to reap
        tokio::time::sleep(POLL_INTERVAL).await;
        still_alive(processes, &alive).await
    };
    if !survivors.is_empty() {
        warn!(root, ?survivors, "processes survived SIGKILL");
    }

    KillOutcome {
        tree,
        forced: alive,
        survivors,
    }
}

async fn still_alive<P: ProcessAdapter>(processes: &P, pids: &[u32]) -> Vec<u32> {
    let mut alive = Vec::new();
    for pid in pids {
        if processes.is_alive(*pid).await {
            alive.push(*pid);
        }
    }
    alive
}

async fn send<P: ProcessAdapter>(processes: &P, pid: u32, signal: Signal) {
    match processes.signal(pid, signal).await {
        Ok(()) | Err(ProcessError::NotFound(_)) => {}
        Err(e) => warn!(pid, %signal, error = %e, "signal failed"),
    }
}

#[cfg(test)]
#[path = "kill_tree_tests.rs"]
mod tests;
