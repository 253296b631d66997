//! CLI help output specs

use crate::prelude::*;

#[test]
fn no_args_shows_usage_and_exits_zero() {
    cli().passes().stdout_has("Usage:");
}

#[test]
fn help_lists_commands() {
    cli()
        .args(&["--help"])
        .passes()
        .stdout_has("setup")
        .stdout_has("ports")
        .stdout_has("start")
        .stdout_has("registry");
}

#[test]
fn registry_help_shows_subcommands() {
    cli()
        .args(&["registry", "--help"])
        .passes()
        .stdout_has("list")
        .stdout_has("clean")
        .stdout_has("release");
}

#[test]
fn version_shows_version() {
    cli().args(&["--version"]).passes().stdout_has("0.1");
}
