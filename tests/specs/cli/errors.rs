//! Error reporting specs

use crate::prelude::*;

#[test]
fn missing_manifest_is_an_error() {
    let ws = Workspace::new("no-manifest");
    ws.berth()
        .args(&["ports"])
        .fails()
        .code(1)
        .stderr_has("Error: no berth.toml found");
}

#[test]
fn invalid_manifest_names_the_file() {
    let ws = Workspace::with_manifest("bad-manifest", "[[docker]]\nnmae = \"db\"\n");
    ws.berth()
        .args(&["ports"])
        .fails()
        .code(1)
        .stderr_has("berth.toml");
}

#[test]
fn unknown_resource_fails() {
    let ws = Workspace::with_manifest("unknown-res", BASIC_MANIFEST);
    ws.berth()
        .args(&["port", "redis"])
        .fails()
        .code(1)
        .stderr_has("unknown resource: redis");
}

#[test]
fn invalid_grid_fails_before_claiming() {
    let ws = Workspace::with_manifest(
        "bad-grid",
        "[ports]\nspacing = 0\n\n[[docker]]\nname = \"db\"\n",
    );
    ws.berth().args(&["setup"]).fails().code(1);
    assert_eq!(ws.registry_contents(), "");
}
