// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Concrete adapters for the machine berth runs on.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use berth_adapters::{
    HostContainerRuntime, SystemPortProbe, SystemProcesses, TracedContainers, TracedProcesses,
};
use berth_engine::{paths, ClaimRegistry, ConflictChecker, LivenessOracle, Supervisor};
use berth_storage::RegistryFile;

use crate::env;

pub type Processes = TracedProcesses<SystemProcesses>;
pub type Containers = TracedContainers<HostContainerRuntime>;
pub type Checker = ConflictChecker<Processes, Containers, SystemPortProbe>;
pub type Registry = ClaimRegistry<Processes, Containers>;
pub type HostSupervisor = Supervisor<Processes, Containers, SystemPortProbe>;

pub struct Host {
    processes: Processes,
    containers: Containers,
    home: PathBuf,
}

impl Host {
    pub fn from_env() -> Result<Self> {
        let home = env::berth_home()
            .ok_or_else(|| anyhow!("cannot locate a state directory, set BERTH_HOME"))?;
        Ok(Self {
            processes: TracedProcesses::new(SystemProcesses::new()),
            containers: TracedContainers::new(HostContainerRuntime::from_env()),
            home,
        })
    }

    pub fn processes(&self) -> &Processes {
        &self.processes
    }

    fn registry_path(&self) -> PathBuf {
        paths::registry_path(&self.home)
    }

    pub fn registry(&self) -> Registry {
        let file = RegistryFile::new(self.registry_path(), berth_engine::env::lock_config());
        ClaimRegistry::new(
            file,
            LivenessOracle::new(self.processes.clone(), self.containers.clone()),
        )
    }

    pub fn checker(&self) -> Checker {
        ConflictChecker::new(
            self.processes.clone(),
            self.containers.clone(),
            SystemPortProbe::new(),
        )
    }

    pub fn supervisor(&self, root: &Path) -> HostSupervisor {
        Supervisor::new(self.processes.clone(), self.checker(), root)
    }
}
