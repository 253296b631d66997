// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use berth_adapters::{FakeContainerRuntime, FakePortProbe, FakeProcessAdapter, Signal};
use berth_core::test_support::web_server;
use tempfile::TempDir;

type TestSupervisor = Supervisor<FakeProcessAdapter, FakeContainerRuntime, FakePortProbe>;

struct Fixture {
    root: TempDir,
    processes: FakeProcessAdapter,
    probe: FakePortProbe,
    supervisor: TestSupervisor,
}

fn fixture() -> Fixture {
    let root = TempDir::new().unwrap();
    let processes = FakeProcessAdapter::new();
    let probe = FakePortProbe::new();
    let checker = ConflictChecker::new(processes.clone(), FakeContainerRuntime::new(), probe.clone());
    let supervisor =
        Supervisor::new(processes.clone(), checker, root.path()).with_grace(Duration::from_millis(100));
    Fixture {
        root,
        processes,
        probe,
        supervisor,
    }
}

fn web(f: &Fixture) -> StartRequest {
    StartRequest::dev_server(&web_server(10), f.root.path(), 10030)
        .with_env(vec![("POSTGRES_PORT".to_string(), "10020".to_string())])
}

#[tokio::test]
async fn start_spawns_with_port_and_records() {
    let f = fixture();

    let pid = f.supervisor.start(&web(&f)).await.unwrap();

    let spawned = f.processes.spawned();
    assert_eq!(spawned.len(), 1);
    assert_eq!(spawned[0].command, "serve --port 10030");
    assert_eq!(spawned[0].cwd, f.root.path().join("apps/web"));
    assert_eq!(
        spawned[0].env,
        vec![
            ("PORT".to_string(), "10030".to_string()),
            ("POSTGRES_PORT".to_string(), "10020".to_string()),
        ]
    );
    assert_eq!(spawned[0].log_path, f.root.path().join(".berth/logs/web.log"));

    let record = f.supervisor.pid_file().get("web").unwrap().unwrap();
    assert_eq!(record.pid, pid);
    assert_eq!(record.port, 10030);
}

#[tokio::test]
async fn start_refuses_bound_port() {
    let f = fixture();
    f.probe.bind(10030);

    let err = f.supervisor.start(&web(&f)).await.unwrap_err();

    assert!(matches!(err, SupervisorError::PortInUse(ref c) if c.port == 10030), "got {err:?}");
    assert!(f.processes.spawned().is_empty());
    assert!(f.supervisor.pid_file().load().unwrap().is_empty());
}

#[tokio::test]
async fn restart_stops_previous_instance_first() {
    let f = fixture();
    let first = f.supervisor.start(&web(&f)).await.unwrap();

    let second = f.supervisor.start(&web(&f)).await.unwrap();

    assert_ne!(first, second);
    assert!(!f.processes.is_alive(first).await);
    assert!(f.processes.signals().contains(&(first, Signal::Term)));
    let records = f.supervisor.pid_file().load().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].pid, second);
}

#[tokio::test]
async fn unrecordable_name_is_refused_before_spawning() {
    let f = fixture();
    let mut request = web(&f);
    request.name = "api:v2".to_string();

    let err = f.supervisor.start(&request).await.unwrap_err();

    assert!(matches!(err, SupervisorError::InvalidName(_)), "got {err:?}");
    assert!(f.processes.spawned().is_empty());
    assert!(f.supervisor.pid_file().load().unwrap().is_empty());
}

#[tokio::test]
async fn spawn_failure_leaves_no_record() {
    let f = fixture();
    f.processes.fail_spawns("sh: not found");

    let err = f.supervisor.start(&web(&f)).await.unwrap_err();

    assert!(matches!(err, SupervisorError::Spawn(_)));
    assert!(f.supervisor.pid_file().load().unwrap().is_empty());
}

#[tokio::test]
async fn status_reports_pid_liveness() {
    let f = fixture();
    let pid = f.supervisor.start(&web(&f)).await.unwrap();

    let status = f.supervisor.status().await.unwrap();
    assert_eq!(status.len(), 1);
    assert!(status[0].running());

    f.processes.exit(pid);
    let status = f.supervisor.status().await.unwrap();
    assert_eq!(status[0].state, ProcessState::Terminated);
}

#[tokio::test]
async fn stop_all_kills_trees_and_clears_records() {
    let f = fixture();
    let pid = f.supervisor.start(&web(&f)).await.unwrap();
    f.processes.add_process(9001, Some(pid), "node");
    f.processes.add_process(9002, Some(9001), "esbuild");
    f.processes.ignore_term(9002);

    let stopped = f.supervisor.stop_all().await.unwrap();

    assert_eq!(stopped.len(), 1);
    let outcome = stopped[0].outcome.as_ref().unwrap();
    assert_eq!(outcome.tree, vec![9002, 9001, pid]);
    assert_eq!(outcome.forced, vec![9002]);
    for p in [pid, 9001, 9002] {
        assert!(!f.processes.is_alive(p).await);
    }
    assert!(!f.supervisor.pid_file().path().exists());
}

#[tokio::test]
async fn stop_all_skips_exited_processes() {
    let f = fixture();
    let pid = f.supervisor.start(&web(&f)).await.unwrap();
    f.processes.exit(pid);

    let stopped = f.supervisor.stop_all().await.unwrap();

    assert!(stopped[0].outcome.is_none());
    assert!(f.processes.signals().is_empty());
    assert!(!f.supervisor.pid_file().path().exists());
}

#[tokio::test]
async fn owned_pids_cover_descendants() {
    let f = fixture();
    let pid = f.supervisor.start(&web(&f)).await.unwrap();
    f.processes.add_process(9001, Some(pid), "node");

    let owned = f.supervisor.owned_pids().await;
    assert_eq!(owned, BTreeSet::from([pid, 9001]));
}

#[tokio::test(start_paused = true)]
async fn supervise_stops_on_shutdown_signal() {
    let f = fixture();
    let pid = f.supervisor.start(&web(&f)).await.unwrap();
    let (tx, rx) = tokio::sync::oneshot::channel::<()>();

    let supervising = f.supervisor.supervise(
        async {
            let _ = rx.await;
        },
        Duration::from_secs(1),
    );
    tx.send(()).unwrap();
    let stopped = supervising.await.unwrap();

    assert_eq!(stopped.len(), 1);
    assert!(!f.processes.is_alive(pid).await);
}

#[tokio::test(start_paused = true)]
async fn supervise_returns_when_children_exit() {
    let f = fixture();
    let pid = f.supervisor.start(&web(&f)).await.unwrap();
    f.processes.exit(pid);

    let stopped = f
        .supervisor
        .supervise(std::future::pending(), Duration::from_millis(100))
        .await
        .unwrap();

    assert!(stopped[0].outcome.is_none());
}
