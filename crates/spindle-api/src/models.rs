// Wire types for the array-management service.
//
// Field names mirror the service's camelCase JSON. Normalization into
// domain types (case folding, state parsing) happens in spindle-core,
// not here -- these structs stay faithful to the bytes on the wire.

use serde::{Deserialize, Serialize};

// ── Status & inventory responses ────────────────────────────────────

/// `GET /api/storage/raid` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaidStatusResponse {
    pub arrays: Vec<RaidArrayWire>,
    #[serde(default)]
    pub speed_limits: SpeedLimitsWire,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaidArrayWire {
    pub name: String,
    pub level: String,
    /// Raw status string, e.g. "optimal" / "Degraded" -- case varies by
    /// firmware version.
    pub status: String,
    #[serde(default)]
    pub bitmap: Option<String>,
    #[serde(default)]
    pub sync_action: Option<String>,
    #[serde(default)]
    pub resync_progress: Option<f64>,
    pub size_bytes: u64,
    #[serde(default)]
    pub devices: Vec<MemberWire>,
    #[serde(default)]
    pub cache: Option<CacheVolumeWire>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberWire {
    pub name: String,
    /// Raw member state string; unrecognized values are preserved
    /// verbatim downstream.
    pub state: String,
}

/// Acceleration-cache volume attached to an array.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheVolumeWire {
    pub name: String,
    #[serde(default)]
    pub size_bytes: Option<u64>,
}

/// Global background sync/rebuild throttle, kB/s.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeedLimitsWire {
    #[serde(default)]
    pub minimum: Option<u64>,
    #[serde(default)]
    pub maximum: Option<u64>,
}

/// `GET /api/storage/disks` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiskInventoryResponse {
    pub disks: Vec<DiskWire>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiskWire {
    pub name: String,
    pub size_bytes: u64,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub in_raid: bool,
    #[serde(default)]
    pub is_os_disk: bool,
    #[serde(default)]
    pub is_ssd: bool,
    #[serde(default)]
    pub is_partitioned: bool,
    #[serde(default)]
    pub is_cache_device: bool,
}

// ── Mutation envelopes ──────────────────────────────────────────────

/// Success envelope for every mutating call: a human-readable status
/// message, displayed verbatim and never machine-parsed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionMessage {
    pub message: String,
}

/// Error body the service returns on a rejected mutation.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceErrorBody {
    pub error: String,
    #[serde(default)]
    pub detail: Option<String>,
}

// ── Mutation requests ───────────────────────────────────────────────

/// `PUT /api/storage/raid/{array}/options` body. All fields optional;
/// absent fields are omitted from the payload entirely.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrayOptionsUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_bitmap: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trigger_scrub: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub write_mostly_device: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub write_mostly: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remove_device: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub add_spare: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed_limit_min: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed_limit_max: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatDiskRequest {
    pub filesystem: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateArrayRequest {
    pub disks: Vec<String>,
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCacheRequest {
    pub disks: Vec<String>,
}
