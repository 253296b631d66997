//! Shared registry specs

use crate::prelude::*;

#[test]
fn empty_registry_lists_nothing() {
    let ws = Workspace::new("empty-registry");
    ws.berth()
        .args(&["registry", "list"])
        .passes()
        .stdout_eq("No claims\n");
}

#[test]
fn empty_registry_json_is_an_empty_array() {
    let ws = Workspace::new("empty-registry-json");
    let run = ws.berth().args(&["registry", "list", "-o", "json"]).passes();
    assert_eq!(run.json(), serde_json::json!([]));
}

#[test]
fn dead_claims_are_listed_then_cleaned() {
    let ws = Workspace::new("dead-claims");
    std::fs::write(
        ws.home().join("registry.tsv"),
        "10100\tghost\t/nonexistent/ghost\t1700000000\t999999999\n",
    )
    .unwrap();

    ws.berth()
        .args(&["registry", "list"])
        .passes()
        .stdout_has("ghost")
        .stdout_has("dead");

    ws.berth()
        .args(&["registry", "clean"])
        .passes()
        .stdout_has("Removed ghost")
        .stdout_has("1 removed, 0 kept");
    assert_eq!(ws.registry_contents(), "");
}

#[test]
fn release_by_name() {
    let ws = Workspace::new("release-named");
    std::fs::write(
        ws.home().join("registry.tsv"),
        "10100\tother\t/src/other\t1700000000\t999999999\n",
    )
    .unwrap();

    ws.berth()
        .args(&["registry", "release", "other"])
        .passes()
        .stdout_has("Released claim for other");
    ws.berth()
        .args(&["registry", "release", "other"])
        .passes()
        .stdout_has("No claim for other");
}

#[test]
fn release_defaults_to_current_workspace() {
    let ws = Workspace::with_manifest("release-current", BASIC_MANIFEST);
    ws.berth().args(&["setup"]).passes();
    assert!(ws.registry_contents().contains("release-current"));

    ws.berth().args(&["registry", "release"]).passes();
    assert_eq!(ws.registry_contents(), "");
}
