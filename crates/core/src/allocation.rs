// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deterministic port allocation from a base port.
//!
//! Docker resources take consecutive blocks from offset 0 in declaration
//! order, docker extras continue the same sequence, and dev servers sit at
//! their pinned offsets. The result is a pure function of the inputs and is
//! recomputed on every invocation; it is never persisted.

use crate::resource::{DevServerSpec, ResourceSpec};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AllocationError {
    #[error("no resources declared")]
    NoResources,
    #[error("resource with empty name")]
    EmptyName,
    #[error("resource name {0:?} may not contain ':', '/' or whitespace control characters")]
    InvalidName(String),
    #[error("resource {0:?} declared more than once")]
    DuplicateName(String),
    #[error("resource {0:?} requests zero ports")]
    ZeroPorts(String),
    #[error("resource {name:?} lists container port {port} twice")]
    DuplicateContainerPort { name: String, port: u16 },
    #[error("resource {name:?} would use port {port}, past 65535")]
    PortOutOfRange { name: String, port: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Docker,
    DockerExtra,
    DevServer,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourcePorts {
    /// First host port of the resource's block.
    pub primary: u16,
    /// Host port per container port (or ordinal); empty for dev servers.
    pub host_port_by_container_port: BTreeMap<u16, u16>,
}

impl ResourcePorts {
    /// Every host port of the block, ascending.
    pub fn host_ports(&self) -> Vec<u16> {
        if self.host_port_by_container_port.is_empty() {
            return vec![self.primary];
        }
        let mut ports: Vec<u16> = self.host_port_by_container_port.values().copied().collect();
        ports.sort_unstable();
        ports
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AllocatedResource {
    pub name: String,
    pub kind: ResourceKind,
    pub ports: ResourcePorts,
}

/// Two resources assigned the same host port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortOverlap {
    pub port: u16,
    pub first: String,
    pub second: String,
}

/// Concrete ports for one allocation round, keyed by resource name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortAllocation {
    base_port: u16,
    resources: Vec<AllocatedResource>,
}

impl PortAllocation {
    pub fn base_port(&self) -> u16 {
        self.base_port
    }

    /// Resources in allocation order.
    pub fn resources(&self) -> &[AllocatedResource] {
        &self.resources
    }

    pub fn get(&self, name: &str) -> Option<&AllocatedResource> {
        self.resources.iter().find(|r| r.name == name)
    }

    /// Primary host port of `name`.
    pub fn resolve_port(&self, name: &str) -> Option<u16> {
        self.get(name).map(|r| r.ports.primary)
    }

    /// `(resource, host_port)` for every allocated port.
    pub fn host_ports(&self) -> impl Iterator<Item = (&str, u16)> + '_ {
        self.resources.iter().flat_map(|r| {
            r.ports
                .host_ports()
                .into_iter()
                .map(move |port| (r.name.as_str(), port))
        })
    }

    /// Host ports handed to more than one resource.
    pub fn overlaps(&self) -> Vec<PortOverlap> {
        let mut owner: BTreeMap<u16, &str> = BTreeMap::new();
        let mut overlaps = Vec::new();
        for (name, port) in self.host_ports() {
            match owner.get(&port) {
                Some(first) if *first != name => overlaps.push(PortOverlap {
                    port,
                    first: first.to_string(),
                    second: name.to_string(),
                }),
                Some(_) => {}
                None => {
                    owner.insert(port, name);
                }
            }
        }
        overlaps
    }

    /// Environment exposure: `NAME_PORT` per resource plus
    /// `NAME_PORT_<key>` for each port of multi-port resources.
    pub fn env_vars(&self) -> Vec<(String, String)> {
        let mut vars = Vec::new();
        for resource in &self.resources {
            let key = env_key(&resource.name);
            vars.push((format!("{key}_PORT"), resource.ports.primary.to_string()));
            if resource.ports.host_port_by_container_port.len() > 1 {
                for (container, host) in &resource.ports.host_port_by_container_port {
                    vars.push((format!("{key}_PORT_{container}"), host.to_string()));
                }
            }
        }
        vars
    }
}

fn env_key(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect()
}

/// Assign host ports to every resource relative to `base_port`.
pub fn allocate(
    base_port: u16,
    docker: &[ResourceSpec],
    docker_extra: &[ResourceSpec],
    dev_servers: &[DevServerSpec],
) -> Result<PortAllocation, AllocationError> {
    if docker.is_empty() && docker_extra.is_empty() && dev_servers.is_empty() {
        return Err(AllocationError::NoResources);
    }

    let mut seen = HashSet::new();
    let mut resources = Vec::with_capacity(docker.len() + docker_extra.len() + dev_servers.len());
    let mut offset: u32 = 0;

    let sequenced = docker
        .iter()
        .map(|spec| (spec, ResourceKind::Docker))
        .chain(docker_extra.iter().map(|spec| (spec, ResourceKind::DockerExtra)));
    for (spec, kind) in sequenced {
        check_name(&mut seen, &spec.name)?;
        if spec.container_port_count == 0 {
            return Err(AllocationError::ZeroPorts(spec.name.clone()));
        }
        let mut mapping = BTreeMap::new();
        for (index, key) in spec.mapping_keys().into_iter().enumerate() {
            let host = host_port(&spec.name, base_port, offset + index as u32)?;
            if mapping.insert(key, host).is_some() {
                return Err(AllocationError::DuplicateContainerPort {
                    name: spec.name.clone(),
                    port: key,
                });
            }
        }
        resources.push(AllocatedResource {
            name: spec.name.clone(),
            kind,
            ports: ResourcePorts {
                primary: host_port(&spec.name, base_port, offset)?,
                host_port_by_container_port: mapping,
            },
        });
        offset += u32::from(spec.container_port_count);
    }

    for spec in dev_servers {
        check_name(&mut seen, &spec.name)?;
        resources.push(AllocatedResource {
            name: spec.name.clone(),
            kind: ResourceKind::DevServer,
            ports: ResourcePorts {
                primary: host_port(&spec.name, base_port, u32::from(spec.offset))?,
                host_port_by_container_port: BTreeMap::new(),
            },
        });
    }

    Ok(PortAllocation {
        base_port,
        resources,
    })
}

/// Reject names that cannot be stored in the pid file, the claim
/// registry, or used as a log file name.
pub fn validate_name(name: &str) -> Result<(), AllocationError> {
    if name.is_empty() {
        return Err(AllocationError::EmptyName);
    }
    if name.contains([':', '/', '\t', '\n', '\r']) {
        return Err(AllocationError::InvalidName(name.to_string()));
    }
    Ok(())
}

fn check_name(seen: &mut HashSet<String>, name: &str) -> Result<(), AllocationError> {
    validate_name(name)?;
    if !seen.insert(name.to_string()) {
        return Err(AllocationError::DuplicateName(name.to_string()));
    }
    Ok(())
}

fn host_port(name: &str, base_port: u16, offset: u32) -> Result<u16, AllocationError> {
    let port = u32::from(base_port) + offset;
    u16::try_from(port).map_err(|_| AllocationError::PortOutOfRange {
        name: name.to_string(),
        port,
    })
}

#[cfg(test)]
#[path = "allocation_tests.rs"]
mod tests;
