// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Hashed port grid.
//!
//! Every non-main workspace hashes onto one of `range / spacing` buckets;
//! bucket `b` owns ports `[min + b * spacing, min + (b + 1) * spacing)`.
//! Collisions with live claims are resolved by linear probing over buckets,
//! see [`PortGrid::candidate`].

use serde::Serialize;
use sha2::{Digest, Sha256};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridError {
    #[error("port spacing must be at least 1")]
    ZeroSpacing,
    #[error("port range {range} is smaller than the spacing {spacing}")]
    RangeTooSmall { range: u32, spacing: u16 },
    #[error("port grid {min}..{end} extends past 65535")]
    PastPortSpace { min: u16, end: u32 },
    #[error("max_probes must be at least 1")]
    ZeroProbes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PortGrid {
    /// Base port of the main checkout (workspace name == project name).
    pub default_port: u16,
    /// First port of the hashed range.
    pub min_port: u16,
    /// Width of the hashed range.
    pub port_range: u32,
    /// Ports reserved per workspace; also the bucket width.
    pub spacing: u16,
    /// Bucket probes attempted before settling on the last candidate.
    pub max_probes: u32,
}

impl Default for PortGrid {
    fn default() -> Self {
        Self {
            default_port: 1481,
            min_port: 10000,
            port_range: 50000,
            spacing: 20,
            max_probes: 10,
        }
    }
}

impl PortGrid {
    pub fn validate(&self) -> Result<(), GridError> {
        if self.spacing == 0 {
            return Err(GridError::ZeroSpacing);
        }
        if self.port_range < u32::from(self.spacing) {
            return Err(GridError::RangeTooSmall {
                range: self.port_range,
                spacing: self.spacing,
            });
        }
        let end = u32::from(self.min_port) + self.num_buckets() * u32::from(self.spacing);
        if end > 65536 {
            return Err(GridError::PastPortSpace {
                min: self.min_port,
                end,
            });
        }
        if self.max_probes == 0 {
            return Err(GridError::ZeroProbes);
        }
        Ok(())
    }

    pub fn num_buckets(&self) -> u32 {
        self.port_range / u32::from(self.spacing.max(1))
    }

    /// Whether `workspace` is the project's main checkout.
    pub fn is_main(workspace: &str, project: &str) -> bool {
        workspace == project
    }

    /// Stable hash of a workspace name: the first four bytes of its SHA-256
    /// digest read as a big-endian integer.
    pub fn hash(workspace: &str) -> u32 {
        let digest = Sha256::digest(workspace.as_bytes());
        u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]])
    }

    /// Base port of `bucket`.
    pub fn bucket_port(&self, bucket: u32) -> u16 {
        let offset = (bucket % self.num_buckets().max(1)) * u32::from(self.spacing);
        // validate() bounds min + buckets * spacing to 65536
        u16::try_from(u32::from(self.min_port) + offset).unwrap_or(u16::MAX)
    }

    /// Base port for `workspace` on probe attempt `probe` (0 = home bucket).
    pub fn candidate(&self, workspace: &str, probe: u32) -> u16 {
        let buckets = u64::from(self.num_buckets().max(1));
        let bucket = (u64::from(Self::hash(workspace)) + u64::from(probe)) % buckets;
        self.bucket_port(bucket as u32)
    }

    /// Last port of the hashed range (inclusive).
    pub fn max_port(&self) -> u16 {
        self.bucket_port(self.num_buckets().saturating_sub(1))
            .saturating_add(self.spacing.saturating_sub(1))
    }
}

#[cfg(test)]
#[path = "grid_tests.rs"]
mod tests;
