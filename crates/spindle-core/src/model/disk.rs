// ── Physical disk inventory types ──

use serde::{Deserialize, Serialize};

/// A physical disk visible to the system, independent of array
/// membership.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct AvailableDisk {
    pub name: String,
    pub size_bytes: u64,
    pub model: Option<String>,

    /// Already a member of some array.
    pub in_raid: bool,
    /// Hosts the operating system -- never eligible for destructive ops.
    pub is_os_disk: bool,
    pub is_ssd: bool,
    pub is_partitioned: bool,
    /// Already serving as an acceleration-cache device.
    pub is_cache_device: bool,
}
