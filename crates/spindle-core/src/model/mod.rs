//! Canonical domain types.
//!
//! All of these are pure projections of the most recent successful poll
//! response -- never constructed or mutated client-side, always replaced
//! wholesale when a new snapshot arrives.

pub mod array;
pub mod disk;

pub use array::{ArrayMember, ArrayStatus, CacheVolume, MemberState, RaidArray, SpeedLimits};
pub use disk::AvailableDisk;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One poll response from `GetArrayStatus`, stamped at capture time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub captured_at: DateTime<Utc>,
    pub arrays: Vec<RaidArray>,
    /// Global throttle shared by every array's background operations.
    pub speed_limits: SpeedLimits,
}

impl StatusSnapshot {
    pub fn array(&self, name: &str) -> Option<&RaidArray> {
        self.arrays.iter().find(|a| a.name == name)
    }
}

/// One poll response from `GetAvailableDisks`, stamped at capture time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiskSnapshot {
    pub captured_at: DateTime<Utc>,
    pub disks: Vec<AvailableDisk>,
}

impl DiskSnapshot {
    pub fn disk(&self, name: &str) -> Option<&AvailableDisk> {
        self.disks.iter().find(|d| d.name == name)
    }
}
