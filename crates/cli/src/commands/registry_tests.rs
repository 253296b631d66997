// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use berth_core::test_support::claim;

#[test]
fn only_bare_release_needs_a_project() {
    assert!(!RegistryCommand::List.needs_project());
    assert!(!RegistryCommand::Clean.needs_project());
    assert!(!RegistryCommand::Release {
        workspace: Some("feature-x".to_string())
    }
    .needs_project());
    assert!(RegistryCommand::Release { workspace: None }.needs_project());
}

#[test]
fn claims_table_marks_liveness() {
    let claims = vec![
        ClaimStatus {
            record: claim(10000, "alpha", 11),
            alive: true,
        },
        ClaimStatus {
            record: claim(10020, "beta", 12),
            alive: false,
        },
    ];
    let table = claims_table(&claims);
    let rows = table.rows();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0][0], "10000");
    assert_eq!(rows[0][1], "alpha");
    assert_eq!(rows[0][4], "alive");
    assert_eq!(rows[1][4], "dead");
    assert_eq!(rows[1][5], "/src/beta");
}
