// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::tempdir;

fn fast(wait_ms: u64, stale_ms: u64) -> LockConfig {
    LockConfig {
        wait: Duration::from_millis(wait_ms),
        poll: Duration::from_millis(5),
        stale_after: Duration::from_millis(stale_ms),
    }
}

#[test]
fn acquire_creates_and_drop_removes() {
    let dir = tempdir().unwrap();
    let lock = DirLock::new(dir.path().join("registry.tsv.lock"), fast(50, 30_000));

    let guard = lock.acquire().unwrap();
    assert!(lock.is_held());
    drop(guard);
    assert!(!lock.is_held());
}

#[test]
fn acquire_creates_missing_parent() {
    let dir = tempdir().unwrap();
    let lock = DirLock::new(dir.path().join("home/registry.tsv.lock"), fast(50, 30_000));
    let _guard = lock.acquire().unwrap();
    assert!(lock.is_held());
}

#[test]
fn fresh_lock_times_out() {
    let dir = tempdir().unwrap();
    let lock = DirLock::new(dir.path().join("l.lock"), fast(30, 30_000));
    let _held = lock.acquire().unwrap();

    let err = lock.acquire().unwrap_err();
    assert!(matches!(err, LockError::Timeout { .. }), "got {err:?}");
    // The holder still owns it
    assert!(lock.is_held());
}

#[test]
fn stale_lock_is_reclaimed() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("l.lock");
    fs::create_dir(&path).unwrap();
    std::thread::sleep(Duration::from_millis(40));

    let lock = DirLock::new(&path, fast(10, 20));
    let guard = lock.acquire().unwrap();
    assert!(lock.is_held());
    drop(guard);
    assert!(!path.exists());
}

#[test]
fn lock_freed_while_waiting_is_taken() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("l.lock");
    let lock = DirLock::new(&path, fast(2_000, 30_000));
    let held = lock.acquire().unwrap();

    let releaser = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(30));
        drop(held);
    });
    let start = Instant::now();
    let _guard = lock.acquire().unwrap();
    assert!(start.elapsed() < Duration::from_millis(2_000));
    releaser.join().unwrap();
}

#[test]
fn unlock_is_idempotent() {
    let dir = tempdir().unwrap();
    let lock = DirLock::new(dir.path().join("l.lock"), fast(10, 30_000));
    lock.unlock();
    let guard = lock.acquire().unwrap();
    lock.unlock();
    lock.unlock();
    drop(guard);
    assert!(!lock.is_held());
}

#[test]
fn with_lock_excludes_other_threads() {
    let dir = tempdir().unwrap();
    let lock = DirLock::new(dir.path().join("l.lock"), fast(5_000, 30_000));
    let inside = Arc::new(AtomicUsize::new(0));
    let max_inside = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let lock = lock.clone();
            let inside = Arc::clone(&inside);
            let max_inside = Arc::clone(&max_inside);
            std::thread::spawn(move || {
                lock.with_lock(|| {
                    let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                    max_inside.fetch_max(now, Ordering::SeqCst);
                    std::thread::sleep(Duration::from_millis(2));
                    inside.fetch_sub(1, Ordering::SeqCst);
                })
                .unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(max_inside.load(Ordering::SeqCst), 1);
}
