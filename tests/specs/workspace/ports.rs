//! Port resolution specs

use crate::prelude::*;

#[test]
fn ports_are_stable_across_invocations() {
    let ws = Workspace::with_manifest("stable-ports", BASIC_MANIFEST);
    let first = ws.port("postgres");
    let second = ws.port("postgres");
    assert_eq!(first, second);
    assert!(first >= 10000);
}

#[test]
fn resources_follow_declaration_order() {
    let ws = Workspace::with_manifest("ordered-ports", BASIC_MANIFEST);
    let base = ws.port("postgres");
    assert_eq!(ws.port("minio"), base + 1);
    assert_eq!(ws.port("web"), base + 10);
}

#[test]
fn main_checkout_uses_default_port() {
    let ws = Workspace::with_manifest(
        "shop",
        "[project]\nname = \"shop\"\ndefault_port = 4100\n\n[[docker]]\nname = \"db\"\n",
    );
    assert_eq!(ws.port("db"), 4100);
}

#[test]
fn workspace_flag_overrides_directory_name() {
    let ws = Workspace::with_manifest(
        "override-dir",
        "[project]\nname = \"shop\"\ndefault_port = 4100\n\n[[docker]]\nname = \"db\"\n",
    );
    ws.berth()
        .args(&["port", "db", "--workspace", "shop"])
        .passes()
        .stdout_eq("4100\n");
}

#[test]
fn env_output_exposes_every_port() {
    let ws = Workspace::with_manifest("env-ports", BASIC_MANIFEST);
    let base = ws.port("postgres");
    ws.berth()
        .args(&["ports", "--env"])
        .passes()
        .stdout_has(&format!("POSTGRES_PORT={base}\n"))
        .stdout_has(&format!("MINIO_PORT_9000={}\n", base + 1))
        .stdout_has(&format!("MINIO_PORT_9001={}\n", base + 2))
        .stdout_has(&format!("WEB_PORT={}\n", base + 10));
}

#[test]
fn ports_json_lists_allocation() {
    let ws = Workspace::with_manifest("json-ports", BASIC_MANIFEST);
    let run = ws.berth().args(&["ports", "-o", "json"]).passes();
    let json = run.json();
    assert_eq!(json["workspace"], "json-ports");
    let resources = json["allocation"]["resources"].as_array().unwrap();
    let names: Vec<&str> = resources
        .iter()
        .map(|r| r["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["postgres", "minio", "web"]);
}

#[test]
fn querying_ports_claims_nothing() {
    let ws = Workspace::with_manifest("query-only", BASIC_MANIFEST);
    ws.berth().args(&["ports"]).passes().stdout_has("postgres");
    assert_eq!(ws.registry_contents(), "");
}
