// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Host port probes

use std::io::ErrorKind;
use std::net::{Ipv4Addr, TcpListener};

/// Answers "is something already bound to this TCP port?"
pub trait PortProbe: Clone + Send + Sync + 'static {
    fn is_bound(&self, port: u16) -> bool;
}

/// Probes by attempting a bind on all interfaces
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemPortProbe;

impl SystemPortProbe {
    pub fn new() -> Self {
        Self
    }
}

impl PortProbe for SystemPortProbe {
    fn is_bound(&self, port: u16) -> bool {
        match TcpListener::bind((Ipv4Addr::UNSPECIFIED, port)) {
            Ok(_listener) => false,
            Err(e) if e.kind() == ErrorKind::AddrInUse => true,
            Err(e) => {
                // Privileged ports and the like: we can't tell, assume free
                tracing::debug!(port, error = %e, "bind probe inconclusive");
                false
            }
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakePortProbe;

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::PortProbe;
    use parking_lot::Mutex;
    use std::collections::BTreeSet;
    use std::sync::Arc;

    /// Fake probe with an explicit set of bound ports
    #[derive(Clone, Default)]
    pub struct FakePortProbe {
        bound: Arc<Mutex<BTreeSet<u16>>>,
    }

    impl FakePortProbe {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn bind(&self, port: u16) {
            self.bound.lock().insert(port);
        }

        pub fn unbind(&self, port: u16) {
            self.bound.lock().remove(&port);
        }
    }

    impl PortProbe for FakePortProbe {
        fn is_bound(&self, port: u16) -> bool {
            self.bound.lock().contains(&port)
        }
    }
}

#[cfg(test)]
#[path = "net_tests.rs"]
mod tests;
