// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use proptest::prelude::*;

#[test]
fn default_grid_is_valid() {
    let grid = PortGrid::default();
    assert_eq!(grid.validate(), Ok(()));
    assert_eq!(grid.num_buckets(), 2500);
    assert_eq!(grid.max_port(), 59999);
}

#[yare::parameterized(
    zero_spacing = { PortGrid { spacing: 0, ..PortGrid::default() }, GridError::ZeroSpacing },
    tiny_range   = { PortGrid { port_range: 10, ..PortGrid::default() }, GridError::RangeTooSmall { range: 10, spacing: 20 } },
    past_65535   = { PortGrid { min_port: 20000, ..PortGrid::default() }, GridError::PastPortSpace { min: 20000, end: 70000 } },
    zero_probes  = { PortGrid { max_probes: 0, ..PortGrid::default() }, GridError::ZeroProbes },
)]
fn invalid_grids(grid: PortGrid, expected: GridError) {
    assert_eq!(grid.validate(), Err(expected));
}

#[test]
fn hash_is_deterministic() {
    assert_eq!(PortGrid::hash("myapp-feature"), PortGrid::hash("myapp-feature"));
    assert_ne!(PortGrid::hash("myapp-feature"), PortGrid::hash("myapp-feature2"));
}

#[test]
fn main_checkout_detection() {
    assert!(PortGrid::is_main("myapp", "myapp"));
    assert!(!PortGrid::is_main("myapp-feature", "myapp"));
}

#[test]
fn probing_walks_adjacent_buckets() {
    let grid = PortGrid::default();
    let home = grid.candidate("myapp-feature", 0);
    let next = grid.candidate("myapp-feature", 1);
    if home == grid.max_port() - (grid.spacing - 1) {
        assert_eq!(next, grid.min_port);
    } else {
        assert_eq!(next, home + grid.spacing);
    }
}

#[test]
fn probing_wraps_to_min_port() {
    let grid = PortGrid::default();
    let hash = PortGrid::hash("wrap");
    let to_last = grid.num_buckets() - 1 - (hash % grid.num_buckets());
    assert_eq!(
        grid.candidate("wrap", to_last),
        grid.max_port() - (grid.spacing - 1)
    );
    assert_eq!(grid.candidate("wrap", to_last + 1), grid.min_port);
}

proptest! {
    #[test]
    fn candidates_stay_on_the_grid(name in "[a-z][a-z0-9-]{0,30}", probe in 0u32..50) {
        let grid = PortGrid::default();
        let port = grid.candidate(&name, probe);
        prop_assert!(port >= 10000 && port < 60000);
        prop_assert_eq!((port - grid.min_port) % grid.spacing, 0);
    }

    #[test]
    fn custom_grids_stay_in_range(
        min in 1024u16..20000,
        spacing in 1u16..100,
        buckets in 1u32..500,
        name in "[a-z]{1,12}",
    ) {
        let grid = PortGrid {
            min_port: min,
            spacing,
            port_range: buckets * u32::from(spacing),
            ..PortGrid::default()
        };
        prop_assume!(grid.validate().is_ok());
        let port = grid.candidate(&name, 0);
        prop_assert!(port >= min);
        prop_assert!(port <= grid.max_port());
    }
}
