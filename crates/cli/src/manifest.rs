// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `berth.toml` discovery and parsing.
//!
//! The manifest lives at the workspace root. Its directory names the
//! workspace; the project name comes from `[project].name`, else the main
//! git checkout, else the workspace itself.

use berth_core::{DevServerSpec, NameError, PortGrid, ResourceSpec, WorkspaceName};
use berth_engine::{ResourcePlan, WorkspaceContext};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const MANIFEST_FILE: &str = "berth.toml";

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("no berth.toml found in {} or any parent directory", .0.display())]
    NotFound(PathBuf),
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("resource {name:?}: `ports = {ports}` disagrees with {listed} listed container_ports")]
    PortCountMismatch {
        name: String,
        ports: u16,
        listed: usize,
    },
    #[error("invalid workspace name: {0}")]
    Workspace(#[from] NameError),
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(default)]
    pub project: ProjectSection,
    #[serde(default)]
    pub ports: PortsSection,
    #[serde(default)]
    pub docker: Vec<DockerEntry>,
    #[serde(default)]
    pub docker_extra: Vec<DockerEntry>,
    #[serde(default)]
    pub dev_server: Vec<DevServerEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectSection {
    pub name: Option<String>,
    pub default_port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PortsSection {
    pub min: Option<u16>,
    pub range: Option<u32>,
    pub spacing: Option<u16>,
    pub max_probes: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DockerEntry {
    pub name: String,
    /// Container port count (default 1)
    pub ports: Option<u16>,
    /// Container ports in order; keys the host mapping
    #[serde(default)]
    pub container_ports: Vec<u16>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DevServerEntry {
    pub name: String,
    #[serde(default = "current_dir")]
    pub dir: PathBuf,
    pub command: String,
    pub offset: u16,
}

fn current_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Manifest {
    pub fn parse(path: &Path, content: &str) -> Result<Self, ManifestError> {
        toml::from_str(content).map_err(|source| ManifestError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let content = std::fs::read_to_string(path).map_err(|source| ManifestError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, &content)
    }

    pub fn grid(&self) -> PortGrid {
        let defaults = PortGrid::default();
        PortGrid {
            default_port: self.project.default_port.unwrap_or(defaults.default_port),
            min_port: self.ports.min.unwrap_or(defaults.min_port),
            port_range: self.ports.range.unwrap_or(defaults.port_range),
            spacing: self.ports.spacing.unwrap_or(defaults.spacing),
            max_probes: self.ports.max_probes.unwrap_or(defaults.max_probes),
        }
    }

    pub fn plan(&self) -> Result<ResourcePlan, ManifestError> {
        Ok(ResourcePlan {
            grid: self.grid(),
            docker: docker_specs(&self.docker)?,
            docker_extra: docker_specs(&self.docker_extra)?,
            dev_servers: self
                .dev_server
                .iter()
                .map(|e| DevServerSpec::new(&e.name, &e.dir, &e.command, e.offset))
                .collect(),
        })
    }
}

fn docker_specs(entries: &[DockerEntry]) -> Result<Vec<ResourceSpec>, ManifestError> {
    entries
        .iter()
        .map(|entry| {
            if entry.container_ports.is_empty() {
                return Ok(ResourceSpec::new(&entry.name, entry.ports.unwrap_or(1)));
            }
            match entry.ports {
                Some(ports) if usize::from(ports) != entry.container_ports.len() => {
                    Err(ManifestError::PortCountMismatch {
                        name: entry.name.clone(),
                        ports,
                        listed: entry.container_ports.len(),
                    })
                }
                _ => Ok(ResourceSpec::with_container_ports(
                    &entry.name,
                    entry.container_ports.clone(),
                )),
            }
        })
        .collect()
}

/// Nearest `berth.toml` at or above `start`.
pub fn find_manifest(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(MANIFEST_FILE))
        .find(|candidate| candidate.is_file())
}

/// Basename of the main git checkout that `root` belongs to.
///
/// In a linked worktree `.git` is a file pointing at
/// `<main>/.git/worktrees/<name>`; in the main checkout it is a directory.
pub fn main_checkout_name(root: &Path) -> Option<String> {
    let dot_git = root.join(".git");
    if dot_git.is_dir() {
        return basename(root);
    }
    let content = std::fs::read_to_string(&dot_git).ok()?;
    let gitdir = content
        .lines()
        .find_map(|line| line.strip_prefix("gitdir:"))
        .map(str::trim)?;
    let gitdir = root.join(gitdir);
    gitdir
        .ancestors()
        .find(|dir| dir.file_name().is_some_and(|n| n == ".git"))
        .and_then(Path::parent)
        .and_then(basename)
}

fn basename(dir: &Path) -> Option<String> {
    dir.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
}

/// A discovered workspace: where it is, what it is called, what it runs.
#[derive(Debug)]
pub struct Project {
    pub ctx: WorkspaceContext,
    pub plan: ResourcePlan,
}

impl Project {
    /// Find and load the manifest governing `cwd`.
    pub fn discover(cwd: &Path, workspace: Option<&str>) -> Result<Self, ManifestError> {
        let path = find_manifest(cwd).ok_or_else(|| ManifestError::NotFound(cwd.to_path_buf()))?;
        let manifest = Manifest::load(&path)?;
        let root = path.parent().unwrap_or(cwd).to_path_buf();
        Self::from_manifest(root, &manifest, workspace)
    }

    pub fn from_manifest(
        root: PathBuf,
        manifest: &Manifest,
        workspace: Option<&str>,
    ) -> Result<Self, ManifestError> {
        let name = match workspace {
            Some(name) => WorkspaceName::new(name)?,
            None => WorkspaceName::from_dir(&root)?,
        };
        let project = manifest
            .project
            .name
            .clone()
            .or_else(|| main_checkout_name(&root))
            .unwrap_or_else(|| name.to_string());
        Ok(Self {
            ctx: WorkspaceContext {
                name,
                project,
                root,
            },
            plan: manifest.plan()?,
        })
    }
}

#[cfg(test)]
#[path = "manifest_tests.rs"]
mod tests;
