//! Dev server supervision specs

use crate::prelude::*;

#[test]
fn start_status_stop() {
    let ws = Workspace::with_manifest("supervised", BASIC_MANIFEST);
    let port = ws.port("web");

    ws.berth()
        .args(&["start"])
        .passes()
        .stdout_has("web")
        .stdout_has(&port.to_string());
    assert!(ws.path().join(".berth/pids").exists());

    ws.berth()
        .args(&["status"])
        .passes()
        .stdout_has("running");

    ws.berth()
        .args(&["stop"])
        .passes()
        .stdout_has("web");

    ws.berth()
        .args(&["status"])
        .passes()
        .stdout_has("No supervised processes");
}

#[test]
fn start_hands_claim_to_dev_server() {
    let ws = Workspace::with_manifest("supervised-claim", BASIC_MANIFEST);
    let run = ws.berth().args(&["start", "-o", "json"]).passes();
    let pid = run.json()[0]["pid"].as_u64().unwrap();

    let registry = ws.registry_contents();
    let owner = registry.trim_end().rsplit('\t').next().unwrap();
    assert_eq!(owner, pid.to_string());

    let listed = ws.berth().args(&["registry", "list", "-o", "json"]).passes();
    assert_eq!(listed.json()[0]["alive"], true);
}

#[test]
fn start_unknown_dev_server_fails() {
    let ws = Workspace::with_manifest("supervised-unknown", BASIC_MANIFEST);
    ws.berth()
        .args(&["start", "api"])
        .fails()
        .code(1)
        .stderr_has("unknown dev server: api");
}

#[test]
fn stop_release_drops_claim() {
    let ws = Workspace::with_manifest("supervised-release", BASIC_MANIFEST);
    ws.berth().args(&["start"]).passes();
    ws.berth()
        .args(&["stop", "--release"])
        .passes()
        .stdout_has("Released claim");
    assert_eq!(ws.registry_contents(), "");
}
