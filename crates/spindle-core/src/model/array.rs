// ── Array domain types ──

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Canonical array status, normalized case-insensitively from the wire.
///
/// A status string the firmware added after this build parses to
/// `Unknown` with the raw text preserved for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ArrayStatus {
    Optimal,
    Degraded,
    Rebuilding,
    Checking,
    Inactive,
    #[strum(default)]
    Unknown(String),
}

impl ArrayStatus {
    pub fn parse(raw: &str) -> Self {
        raw.parse()
            .unwrap_or_else(|_| Self::Unknown(raw.to_owned()))
    }

    /// True while the array runs an active sync/check/rebuild -- the only
    /// states in which a resync progress percentage is meaningful.
    pub fn implies_background_work(&self) -> bool {
        matches!(self, Self::Rebuilding | Self::Checking)
    }
}

/// A member device's role within its array.
///
/// Unrecognized wire states parse to `Unknown` with the raw string kept:
/// no operator action is offered for such a device and the display shows
/// the state exactly as the service reported it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum MemberState {
    Active,
    Rebuilding,
    Failed,
    Removed,
    Spare,
    Blocked,
    WriteMostly,
    #[strum(default)]
    Unknown(String),
}

impl MemberState {
    pub fn parse(raw: &str) -> Self {
        raw.parse()
            .unwrap_or_else(|_| Self::Unknown(raw.to_owned()))
    }
}

/// A physical member of an array.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArrayMember {
    /// Unique within the owning array.
    pub name: String,
    pub state: MemberState,
}

/// Acceleration-cache volume attached to an array. Presence means a
/// secondary caching subsystem is configured.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheVolume {
    pub name: String,
    pub size_bytes: Option<u64>,
}

/// Global background sync/rebuild throttle, kB/s. One record shared by
/// all arrays, not per-array state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeedLimits {
    pub minimum: Option<u64>,
    pub maximum: Option<u64>,
}

/// A named redundant storage aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaidArray {
    /// Unique identifier, stable across polls.
    pub name: String,
    /// Redundancy scheme tag (opaque, e.g. "raid1", "raid5").
    pub level: String,
    pub status: ArrayStatus,
    /// Dirty-region bitmap indicator, absent when no bitmap is configured.
    pub bitmap: Option<String>,
    /// Descriptor of an in-progress background operation ("resync",
    /// "check", ...).
    pub sync_action: Option<String>,
    /// Percentage in [0, 100]; present only while `status` implies active
    /// background work. Array-level, never per-device.
    pub resync_progress: Option<f64>,
    pub size_bytes: u64,
    /// Member devices in display order (order carries no semantics).
    pub devices: Vec<ArrayMember>,
    pub cache: Option<CacheVolume>,
}

impl RaidArray {
    pub fn device(&self, name: &str) -> Option<&ArrayMember> {
        self.devices.iter().find(|d| d.name == name)
    }

    pub fn has_cache(&self) -> bool {
        self.cache.is_some()
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn array_status_parses_case_insensitively() {
        assert_eq!(ArrayStatus::parse("optimal"), ArrayStatus::Optimal);
        assert_eq!(ArrayStatus::parse("Degraded"), ArrayStatus::Degraded);
        assert_eq!(ArrayStatus::parse("REBUILDING"), ArrayStatus::Rebuilding);
        assert_eq!(ArrayStatus::parse("Checking"), ArrayStatus::Checking);
        assert_eq!(ArrayStatus::parse("inactive"), ArrayStatus::Inactive);
    }

    #[test]
    fn unknown_status_preserves_raw_text() {
        let status = ArrayStatus::parse("Resharding");
        assert_eq!(status, ArrayStatus::Unknown("Resharding".into()));
        assert_eq!(status.to_string(), "Resharding");
    }

    #[test]
    fn member_state_parses_kebab_case() {
        assert_eq!(MemberState::parse("active"), MemberState::Active);
        assert_eq!(MemberState::parse("write-mostly"), MemberState::WriteMostly);
        assert_eq!(MemberState::parse("Write-Mostly"), MemberState::WriteMostly);
        assert_eq!(MemberState::parse("spare"), MemberState::Spare);
    }

    #[test]
    fn unknown_member_state_displays_raw_text() {
        let state = MemberState::parse("faulty-ish");
        assert_eq!(state, MemberState::Unknown("faulty-ish".into()));
        assert_eq!(state.to_string(), "faulty-ish");
    }

    #[test]
    fn background_work_states() {
        assert!(ArrayStatus::Rebuilding.implies_background_work());
        assert!(ArrayStatus::Checking.implies_background_work());
        assert!(!ArrayStatus::Optimal.implies_background_work());
        assert!(!ArrayStatus::Degraded.implies_background_work());
        assert!(!ArrayStatus::Inactive.implies_background_work());
    }
}
