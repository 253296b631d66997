//! `berth setup` specs

use crate::prelude::*;

#[test]
fn setup_claims_the_base_port() {
    let ws = Workspace::with_manifest("setup-claims", BASIC_MANIFEST);
    let base = ws.port("postgres");
    ws.berth()
        .args(&["setup"])
        .passes()
        .stdout_has("setup-claims")
        .stdout_has(&base.to_string());

    let registry = ws.registry_contents();
    let fields: Vec<&str> = registry.trim_end().split('\t').collect();
    assert_eq!(fields.len(), 5);
    assert_eq!(fields[0], base.to_string());
    assert_eq!(fields[1], "setup-claims");
}

#[test]
fn setup_twice_keeps_one_claim() {
    let ws = Workspace::with_manifest("setup-twice", BASIC_MANIFEST);
    ws.berth().args(&["setup"]).passes();
    ws.berth().args(&["setup"]).passes();
    assert_eq!(ws.registry_contents().lines().count(), 1);
}

#[test]
fn occupied_port_exits_with_conflict_code() {
    let ws = Workspace::with_manifest("setup-conflict", BASIC_MANIFEST);
    let port = ws.port("web");
    let _listener = std::net::TcpListener::bind(("0.0.0.0", port)).unwrap();

    ws.berth()
        .args(&["setup"])
        .fails()
        .code(2)
        .stdout_has(&format!("port {port} (web) is held by"))
        .stderr_has("1 port conflict(s) unresolved");
}

#[test]
fn conflicts_are_reported_in_json() {
    let ws = Workspace::with_manifest("setup-conflict-json", BASIC_MANIFEST);
    let port = ws.port("postgres");
    let _listener = std::net::TcpListener::bind(("0.0.0.0", port)).unwrap();

    let run = ws.berth().args(&["setup", "-o", "json"]).fails().code(2);
    let json = run.json();
    let conflicts = json["conflicts"]["conflicts"].as_array().unwrap();
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0]["port"], port);
    assert_eq!(conflicts[0]["resource"], "postgres");
}

#[test]
fn live_claim_pushes_workspace_to_next_bucket() {
    let ws = Workspace::with_manifest("setup-probe", BASIC_MANIFEST);
    let hashed = ws.port("postgres");

    // Another workspace, owned by this live test process, holds the bucket.
    std::fs::write(
        ws.home().join("registry.tsv"),
        format!(
            "{hashed}\tneighbour\t/src/neighbour\t1700000000\t{}\n",
            std::process::id()
        ),
    )
    .unwrap();

    let probed = ws.port("postgres");
    assert_ne!(probed, hashed);
    assert_eq!((probed - 10000) % 20, 0);
}
