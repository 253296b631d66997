// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::path::PathBuf;

#[test]
fn empty_name_is_rejected() {
    assert_eq!(WorkspaceName::new(""), Err(NameError::Empty));
}

#[yare::parameterized(
    tab      = { "a\tb" },
    newline  = { "a\nb" },
    carriage = { "a\rb" },
)]
fn control_characters_are_rejected(raw: &str) {
    assert!(matches!(
        WorkspaceName::new(raw),
        Err(NameError::ControlCharacter(_))
    ));
}

#[test]
fn from_dir_uses_basename() {
    let name = WorkspaceName::from_dir(&PathBuf::from("/src/myapp-feature")).unwrap();
    assert_eq!(name, "myapp-feature");
}

#[test]
fn from_root_dir_is_empty() {
    assert_eq!(
        WorkspaceName::from_dir(&PathBuf::from("/")),
        Err(NameError::Empty)
    );
}

#[yare::parameterized(
    plain        = { "myapp", "myapp" },
    mixed_case   = { "MyApp", "myapp" },
    dots_dropped = { "my.app", "myapp" },
    keeps_dashes = { "my-app_2", "my-app_2" },
    spaces       = { "my app", "myapp" },
)]
fn compose_names(raw: &str, expected: &str) {
    assert_eq!(compose_project_name(raw), expected);
}

#[yare::parameterized(
    compose_v2      = { "myapp-postgres-1", true },
    compose_v1      = { "myapp_postgres_1", true },
    exact           = { "myapp", true },
    longer_project  = { "myapp2-postgres-1", false },
    other_project   = { "other-postgres-1", false },
)]
fn owns_container(container: &str, expected: bool) {
    let name = WorkspaceName::new("MyApp").unwrap();
    assert_eq!(name.owns_container(container), expected);
}

#[test]
fn serde_round_trip_validates() {
    let name: WorkspaceName = serde_json::from_str("\"feature-x\"").unwrap();
    assert_eq!(name.as_str(), "feature-x");
    assert!(serde_json::from_str::<WorkspaceName>("\"\"").is_err());
}
