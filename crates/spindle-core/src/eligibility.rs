//! Action-eligibility predicates.
//!
//! Pure, synchronous, no I/O. These functions are the single source of
//! truth for which operator actions the current state permits: the
//! console renders affordances through them and
//! [`ArrayController::execute`](crate::ArrayController::execute)
//! re-validates through them before any remote call. No other code may
//! duplicate this logic.
//!
//! A device in an unrecognized state ([`MemberState::Unknown`]) is
//! treated as unsafe: every predicate returns false for it.

use crate::model::{ArrayMember, ArrayStatus, AvailableDisk, MemberState, RaidArray};

/// Rebuild may start only onto a member the service considers failed.
pub fn can_start_rebuild(device: &ArrayMember) -> bool {
    device.state == MemberState::Failed
}

/// A member can be marked failed while it still participates in the
/// array (active, standby, or write-mostly).
pub fn can_mark_failed(device: &ArrayMember) -> bool {
    matches!(
        device.state,
        MemberState::Active | MemberState::Spare | MemberState::WriteMostly
    )
}

/// Write-mostly can be toggled in either direction, but only between the
/// two states it moves between.
pub fn can_toggle_write_mostly(device: &ArrayMember) -> bool {
    matches!(
        device.state,
        MemberState::Active | MemberState::WriteMostly
    )
}

/// Only standby spares can be removed without degrading the array.
pub fn can_remove_spare(device: &ArrayMember) -> bool {
    device.state == MemberState::Spare
}

/// Finalize is offered while rebuilding AND while still degraded, so the
/// operator can force-acknowledge a rebuild that completed externally.
pub fn should_offer_finalize(array: &RaidArray) -> bool {
    matches!(
        array.status,
        ArrayStatus::Rebuilding | ArrayStatus::Degraded
    )
}

/// Formatting is destructive: never a RAID member, the OS disk, or a
/// cache device.
pub fn can_format(disk: &AvailableDisk) -> bool {
    !disk.in_raid && !disk.is_os_disk && !disk.is_cache_device
}

/// Deletion is always offered; the remote service refuses unsafe
/// deletions itself.
pub fn can_delete_array(_array: &RaidArray) -> bool {
    true
}

/// Creating an array needs at least two disks that are simultaneously
/// outside any RAID and not the OS disk.
pub fn can_create_array(available: &[AvailableDisk]) -> bool {
    available
        .iter()
        .filter(|d| !d.in_raid && !d.is_os_disk)
        .count()
        >= 2
}

/// True for a disk usable as an acceleration-cache device.
pub fn cache_candidate(disk: &AvailableDisk) -> bool {
    disk.is_ssd && !disk.is_os_disk && !disk.in_raid && !disk.is_cache_device
}

/// A cache can be attached when the array has none and an SSD candidate
/// exists.
pub fn can_setup_cache(array: &RaidArray, available: &[AvailableDisk]) -> bool {
    !array.has_cache() && available.iter().any(cache_candidate)
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SpeedLimits;

    fn member(state: MemberState) -> ArrayMember {
        ArrayMember {
            name: "sdb".into(),
            state,
        }
    }

    fn array(status: ArrayStatus) -> RaidArray {
        RaidArray {
            name: "tank".into(),
            level: "raid1".into(),
            status,
            bitmap: None,
            sync_action: None,
            resync_progress: None,
            size_bytes: 0,
            devices: Vec::new(),
            cache: None,
        }
    }

    fn disk(name: &str) -> AvailableDisk {
        AvailableDisk {
            name: name.into(),
            size_bytes: 0,
            model: None,
            in_raid: false,
            is_os_disk: false,
            is_ssd: false,
            is_partitioned: false,
            is_cache_device: false,
        }
    }

    fn all_member_states() -> Vec<MemberState> {
        vec![
            MemberState::Active,
            MemberState::Rebuilding,
            MemberState::Failed,
            MemberState::Removed,
            MemberState::Spare,
            MemberState::Blocked,
            MemberState::WriteMostly,
            MemberState::Unknown("weird".into()),
        ]
    }

    #[test]
    fn rebuild_only_from_failed() {
        for state in all_member_states() {
            let expected = state == MemberState::Failed;
            assert_eq!(
                can_start_rebuild(&member(state.clone())),
                expected,
                "state {state:?}"
            );
        }
    }

    #[test]
    fn mark_failed_from_participating_states() {
        for state in all_member_states() {
            let expected = matches!(
                state,
                MemberState::Active | MemberState::Spare | MemberState::WriteMostly
            );
            assert_eq!(
                can_mark_failed(&member(state.clone())),
                expected,
                "state {state:?}"
            );
        }
    }

    #[test]
    fn write_mostly_toggle_states() {
        for state in all_member_states() {
            let expected = matches!(state, MemberState::Active | MemberState::WriteMostly);
            assert_eq!(
                can_toggle_write_mostly(&member(state.clone())),
                expected,
                "state {state:?}"
            );
        }
    }

    #[test]
    fn remove_only_spares() {
        for state in all_member_states() {
            let expected = state == MemberState::Spare;
            assert_eq!(
                can_remove_spare(&member(state.clone())),
                expected,
                "state {state:?}"
            );
        }
    }

    #[test]
    fn unknown_state_offers_nothing() {
        let m = member(MemberState::Unknown("limbo".into()));
        assert!(!can_start_rebuild(&m));
        assert!(!can_mark_failed(&m));
        assert!(!can_toggle_write_mostly(&m));
        assert!(!can_remove_spare(&m));
    }

    #[test]
    fn finalize_offered_while_rebuilding_or_degraded() {
        assert!(should_offer_finalize(&array(ArrayStatus::Rebuilding)));
        assert!(should_offer_finalize(&array(ArrayStatus::Degraded)));
        assert!(!should_offer_finalize(&array(ArrayStatus::Optimal)));
        assert!(!should_offer_finalize(&array(ArrayStatus::Checking)));
        assert!(!should_offer_finalize(&array(ArrayStatus::Inactive)));
        assert!(!should_offer_finalize(&array(ArrayStatus::Unknown(
            "odd".into()
        ))));
    }

    #[test]
    fn format_excludes_raid_os_and_cache_disks() {
        assert!(can_format(&disk("sdd")));

        let mut raided = disk("sdd");
        raided.in_raid = true;
        assert!(!can_format(&raided));

        let mut os = disk("sda");
        os.is_os_disk = true;
        assert!(!can_format(&os));

        let mut cache = disk("nvme0n1");
        cache.is_cache_device = true;
        assert!(!can_format(&cache));

        // Partitioned alone does not block a format.
        let mut partitioned = disk("sde");
        partitioned.is_partitioned = true;
        assert!(can_format(&partitioned));
    }

    #[test]
    fn create_array_needs_two_free_disks() {
        let free = disk("sdd");
        let mut os = disk("sda");
        os.is_os_disk = true;
        let mut raided = disk("sdb");
        raided.in_raid = true;

        assert!(!can_create_array(&[]));
        assert!(!can_create_array(&[free.clone()]));
        assert!(!can_create_array(&[free.clone(), os.clone(), raided.clone()]));
        assert!(can_create_array(&[free.clone(), disk("sde")]));
        assert!(can_create_array(&[free, disk("sde"), os, raided]));
    }

    #[test]
    fn cache_setup_needs_free_ssd_and_no_existing_cache() {
        let mut ssd = disk("nvme0n1");
        ssd.is_ssd = true;

        let plain = disk("sdd");

        assert!(can_setup_cache(&array(ArrayStatus::Optimal), &[ssd.clone()]));
        assert!(!can_setup_cache(&array(ArrayStatus::Optimal), &[plain]));

        let mut cached = array(ArrayStatus::Optimal);
        cached.cache = Some(crate::model::CacheVolume {
            name: "cache0".into(),
            size_bytes: None,
        });
        assert!(!can_setup_cache(&cached, &[ssd.clone()]));

        let mut busy_ssd = ssd.clone();
        busy_ssd.in_raid = true;
        assert!(!can_setup_cache(&array(ArrayStatus::Optimal), &[busy_ssd]));

        let mut cache_ssd = ssd;
        cache_ssd.is_cache_device = true;
        assert!(!can_setup_cache(&array(ArrayStatus::Optimal), &[cache_ssd]));
    }

    #[test]
    fn delete_always_offered() {
        for status in [
            ArrayStatus::Optimal,
            ArrayStatus::Degraded,
            ArrayStatus::Rebuilding,
            ArrayStatus::Checking,
            ArrayStatus::Inactive,
        ] {
            assert!(can_delete_array(&array(status)));
        }
    }

    #[test]
    fn speed_limits_are_global_not_per_array() {
        // Compile-time shape check more than behavior: the limits record
        // lives on the snapshot, not on RaidArray.
        let limits = SpeedLimits {
            minimum: Some(1_000),
            maximum: Some(200_000),
        };
        assert_eq!(limits.minimum, Some(1_000));
    }
}
