// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use berth_adapters::{FakeProcessAdapter, SpawnRequest, SystemProcesses};

fn family() -> FakeProcessAdapter {
    // 1 ─┬─ 2 ── 4
    //    └─ 3
    let procs = FakeProcessAdapter::new();
    procs.add_process(1, None, "sh");
    procs.add_process(2, Some(1), "npm");
    procs.add_process(3, Some(1), "sleep");
    procs.add_process(4, Some(2), "node");
    procs
}

#[tokio::test]
async fn tree_is_children_before_parents() {
    let procs = family();
    assert_eq!(process_tree(&procs, 1).await, vec![4, 2, 3, 1]);
}

#[tokio::test]
async fn leaf_tree_is_just_itself() {
    let procs = family();
    assert_eq!(process_tree(&procs, 4).await, vec![4]);
}

#[tokio::test(start_paused = true)]
async fn cooperative_tree_needs_no_kill() {
    let procs = family();

    let outcome = kill_tree(&procs, 1, Duration::from_secs(2)).await;

    assert_eq!(outcome.tree, vec![4, 2, 3, 1]);
    assert!(outcome.forced.is_empty());
    assert!(outcome.survivors.is_empty());
    assert!(procs.signals().iter().all(|(_, s)| *s == Signal::Term));
    for pid in 1..=4 {
        assert!(!procs.is_alive(pid).await);
    }
}

#[tokio::test(start_paused = true)]
async fn stubborn_child_is_killed_after_grace() {
    let procs = family();
    procs.ignore_term(4);

    let outcome = kill_tree(&procs, 1, Duration::from_secs(2)).await;

    assert_eq!(outcome.forced, vec![4]);
    assert!(outcome.survivors.is_empty());
    assert_eq!(procs.signals().last(), Some(&(4, Signal::Kill)));
    assert!(!procs.is_alive(4).await);
}

#[tokio::test]
async fn dead_root_is_harmless() {
    let procs = FakeProcessAdapter::new();
    let outcome = kill_tree(&procs, 99, Duration::from_millis(10)).await;
    assert_eq!(outcome.tree, vec![99]);
    assert!(outcome.forced.is_empty());
}

#[tokio::test]
async fn real_tree_with_two_children_is_terminated() {
    let dir = tempfile::tempdir().unwrap();
    let procs = SystemProcesses::new();
    let root = procs
        .spawn(&SpawnRequest {
            command: "sleep 30 & sleep 30 & wait".to_string(),
            cwd: dir.path().to_path_buf(),
            env: vec![],
            log_path: dir.path().join("tree.log"),
        })
        .await
        .unwrap();

    // Wait for both children to appear
    let mut children = Vec::new();
    for _ in 0..100 {
        children = procs.children(root).await.unwrap();
        if children.len() == 2 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(children.len(), 2, "children of {root}: {children:?}");

    let outcome = kill_tree(&procs, root, Duration::from_secs(2)).await;

    assert!(outcome.survivors.is_empty(), "{outcome:?}");
    for pid in children.iter().chain([&root]) {
        assert!(!procs.is_alive(*pid).await, "pid {pid} still alive");
    }
}
