// ── Wire → domain conversion ──
//
// The only place raw service payloads become canonical types. Status
// strings are folded case-insensitively, unknown states are preserved
// verbatim, and the resync-progress invariant is enforced here so no
// downstream consumer ever sees a progress value outside an active
// sync/check/rebuild.

use chrono::Utc;

use spindle_api::models::{
    CacheVolumeWire, DiskInventoryResponse, DiskWire, MemberWire, RaidArrayWire,
    RaidStatusResponse, SpeedLimitsWire,
};

use crate::model::{
    ArrayMember, ArrayStatus, AvailableDisk, CacheVolume, DiskSnapshot, MemberState, RaidArray,
    SpeedLimits, StatusSnapshot,
};

impl From<MemberWire> for ArrayMember {
    fn from(wire: MemberWire) -> Self {
        Self {
            state: MemberState::parse(&wire.state),
            name: wire.name,
        }
    }
}

impl From<CacheVolumeWire> for CacheVolume {
    fn from(wire: CacheVolumeWire) -> Self {
        Self {
            name: wire.name,
            size_bytes: wire.size_bytes,
        }
    }
}

impl From<SpeedLimitsWire> for SpeedLimits {
    fn from(wire: SpeedLimitsWire) -> Self {
        Self {
            minimum: wire.minimum,
            maximum: wire.maximum,
        }
    }
}

impl From<RaidArrayWire> for RaidArray {
    fn from(wire: RaidArrayWire) -> Self {
        let status = ArrayStatus::parse(&wire.status);

        // resync_progress is meaningful only while background work runs;
        // anything else the service sends is a stale leftover.
        let resync_progress = if status.implies_background_work() {
            wire.resync_progress.map(|p| p.clamp(0.0, 100.0))
        } else {
            None
        };

        Self {
            name: wire.name,
            level: wire.level,
            status,
            bitmap: wire.bitmap,
            sync_action: wire.sync_action,
            resync_progress,
            size_bytes: wire.size_bytes,
            devices: wire.devices.into_iter().map(ArrayMember::from).collect(),
            cache: wire.cache.map(CacheVolume::from),
        }
    }
}

impl From<DiskWire> for AvailableDisk {
    fn from(wire: DiskWire) -> Self {
        Self {
            name: wire.name,
            size_bytes: wire.size_bytes,
            model: wire.model,
            in_raid: wire.in_raid,
            is_os_disk: wire.is_os_disk,
            is_ssd: wire.is_ssd,
            is_partitioned: wire.is_partitioned,
            is_cache_device: wire.is_cache_device,
        }
    }
}

impl StatusSnapshot {
    /// Project a poll response into the canonical snapshot, stamped now.
    pub fn from_wire(response: RaidStatusResponse) -> Self {
        Self {
            captured_at: Utc::now(),
            arrays: response.arrays.into_iter().map(RaidArray::from).collect(),
            speed_limits: SpeedLimits::from(response.speed_limits),
        }
    }
}

impl DiskSnapshot {
    /// Project an inventory response into the canonical snapshot.
    pub fn from_wire(response: DiskInventoryResponse) -> Self {
        Self {
            captured_at: Utc::now(),
            disks: response.disks.into_iter().map(AvailableDisk::from).collect(),
        }
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn wire_array(status: &str, progress: Option<f64>) -> RaidArrayWire {
        RaidArrayWire {
            name: "tank".into(),
            level: "raid1".into(),
            status: status.into(),
            bitmap: None,
            sync_action: None,
            resync_progress: progress,
            size_bytes: 1024,
            devices: vec![MemberWire {
                name: "sdb".into(),
                state: "active".into(),
            }],
            cache: None,
        }
    }

    #[test]
    fn progress_kept_while_rebuilding() {
        let array = RaidArray::from(wire_array("rebuilding", Some(42.7)));
        assert_eq!(array.resync_progress, Some(42.7));
    }

    #[test]
    fn progress_dropped_when_no_background_work() {
        let array = RaidArray::from(wire_array("optimal", Some(99.9)));
        assert_eq!(array.resync_progress, None);

        let array = RaidArray::from(wire_array("degraded", Some(12.0)));
        assert_eq!(array.resync_progress, None);
    }

    #[test]
    fn progress_clamped_to_percentage_range() {
        let array = RaidArray::from(wire_array("checking", Some(123.4)));
        assert_eq!(array.resync_progress, Some(100.0));
    }

    #[test]
    fn mixed_case_status_normalized() {
        let array = RaidArray::from(wire_array("Degraded", None));
        assert_eq!(array.status, ArrayStatus::Degraded);
    }

    #[test]
    fn unknown_member_state_survives_conversion() {
        let mut wire = wire_array("optimal", None);
        wire.devices[0].state = "half-baked".into();
        let array = RaidArray::from(wire);
        assert_eq!(
            array.devices[0].state,
            MemberState::Unknown("half-baked".into())
        );
    }
}
