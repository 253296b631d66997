// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn detects_listener_on_port() {
    let listener = TcpListener::bind((Ipv4Addr::UNSPECIFIED, 0)).unwrap();
    let port = listener.local_addr().unwrap().port();

    assert!(SystemPortProbe::new().is_bound(port));

    drop(listener);
    assert!(!SystemPortProbe::new().is_bound(port));
}

#[test]
fn fake_probe_tracks_bindings() {
    let probe = FakePortProbe::new();
    assert!(!probe.is_bound(10000));

    probe.bind(10000);
    assert!(probe.is_bound(10000));

    probe.unbind(10000);
    assert!(!probe.is_bound(10000));
}
