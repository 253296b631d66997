// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Claim registry: conflict queries, claim, release and clean on top of
//! the shared registry file, with liveness judged by the oracle.

use crate::liveness::LivenessOracle;
use berth_adapters::{ContainerRuntime, ProcessAdapter};
use berth_core::{ClaimParseError, ClaimRecord, Clock, SystemClock, WorkspaceName};
use berth_storage::{RegistryError, RegistryFile};
use serde::Serialize;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum ClaimError {
    #[error(transparent)]
    Record(#[from] ClaimParseError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// A claim together with its liveness at the time it was checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClaimStatus {
    #[serde(flatten)]
    pub record: ClaimRecord,
    pub alive: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleanReport {
    pub removed: Vec<ClaimRecord>,
    pub kept: usize,
}

#[derive(Clone)]
pub struct ClaimRegistry<P, C, K = SystemClock> {
    file: RegistryFile,
    oracle: LivenessOracle<P, C>,
    clock: K,
    owner_pid: u32,
}

impl<P: ProcessAdapter, C: ContainerRuntime> ClaimRegistry<P, C, SystemClock> {
    pub fn new(file: RegistryFile, oracle: LivenessOracle<P, C>) -> Self {
        Self::with_clock(file, oracle, SystemClock)
    }
}

impl<P: ProcessAdapter, C: ContainerRuntime, K: Clock> ClaimRegistry<P, C, K> {
    pub fn with_clock(file: RegistryFile, oracle: LivenessOracle<P, C>, clock: K) -> Self {
        Self {
            file,
            oracle,
            clock,
            owner_pid: std::process::id(),
        }
    }

    /// Record claims as owned by `pid` instead of this process.
    pub fn with_owner_pid(mut self, pid: u32) -> Self {
        self.owner_pid = pid;
        self
    }

    pub fn file(&self) -> &RegistryFile {
        &self.file
    }

    pub fn oracle(&self) -> &LivenessOracle<P, C> {
        &self.oracle
    }

    /// Whether a live workspace other than `exclude` holds `base_port`.
    ///
    /// Dead claimants never conflict, so a crashed workspace's record is
    /// reusable before anyone cleans it.
    pub async fn conflict(
        &self,
        base_port: u16,
        exclude: &WorkspaceName,
    ) -> Result<bool, RegistryError> {
        for record in self.file.read()? {
            if record.base_port != base_port || &record.workspace == exclude {
                continue;
            }
            if self
                .oracle
                .is_alive(&record.project_dir, record.owner_pid)
                .await
            {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Claim `base_port` for `workspace`, replacing its previous record.
    pub fn claim(
        &self,
        base_port: u16,
        workspace: &WorkspaceName,
        project_dir: &Path,
    ) -> Result<ClaimRecord, ClaimError> {
        self.claim_as(base_port, workspace, project_dir, self.owner_pid)
    }

    /// Claim with an explicit owner, e.g. a supervised process that outlives
    /// this invocation.
    pub fn claim_as(
        &self,
        base_port: u16,
        workspace: &WorkspaceName,
        project_dir: &Path,
        owner_pid: u32,
    ) -> Result<ClaimRecord, ClaimError> {
        let record = ClaimRecord::new(
            base_port,
            workspace.clone(),
            project_dir,
            self.clock.epoch_secs(),
            owner_pid,
        )?;
        self.file.claim(record.clone())?;
        info!(workspace = %workspace, base_port, owner_pid, "claimed");
        Ok(record)
    }

    /// Drop `workspace`'s record. Returns whether one existed.
    pub fn release(&self, workspace: &WorkspaceName) -> Result<bool, RegistryError> {
        let released = self.file.release(workspace)?;
        info!(workspace = %workspace, released, "released");
        Ok(released)
    }

    /// Every claim with its liveness.
    pub async fn list(&self) -> Result<Vec<ClaimStatus>, RegistryError> {
        let records = self.file.read()?;
        let (live, _) = self.oracle.partition(records.clone()).await;
        Ok(records
            .into_iter()
            .map(|record| {
                let alive = live.contains(&record);
                ClaimStatus { record, alive }
            })
            .collect())
    }

    /// Live claims only.
    pub async fn live_claims(&self) -> Result<Vec<ClaimRecord>, RegistryError> {
        let (live, _) = self.oracle.partition(self.file.read()?).await;
        Ok(live)
    }

    /// Records in `snapshot` whose workspace is no longer alive.
    pub async fn dead_claims(&self, snapshot: Vec<ClaimRecord>) -> Vec<ClaimRecord> {
        self.oracle.partition(snapshot).await.1
    }

    /// Remove dead claims.
    ///
    /// The lock is held only to snapshot and to write back, never across
    /// liveness checks that may shell out to the container runtime. The
    /// write-back removes exact snapshot entries, so a workspace that
    /// re-claimed in between keeps its new record.
    pub async fn clean(&self) -> Result<CleanReport, RegistryError> {
        let snapshot = self.file.snapshot()?;
        let total = snapshot.len();
        let dead = self.dead_claims(snapshot).await;
        if dead.is_empty() {
            return Ok(CleanReport {
                removed: Vec::new(),
                kept: total,
            });
        }

        let removed = self.file.remove_exact(&dead)?;
        let remaining = self.file.read()?;
        let removed_records: Vec<ClaimRecord> =
            dead.into_iter().filter(|r| !remaining.contains(r)).collect();
        if removed_records.len() != removed {
            warn!(removed, "registry changed during clean");
        }
        for record in &removed_records {
            info!(workspace = %record.workspace, base_port = record.base_port, "removed dead claim");
        }
        Ok(CleanReport {
            kept: total.saturating_sub(removed_records.len()),
            removed: removed_records,
        })
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
