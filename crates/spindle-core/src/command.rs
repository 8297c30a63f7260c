// ── Typed mutation commands ──
//
// One variant per operator action. Local input validation lives here and
// runs before the gate is acquired; state-dependent re-validation
// against the current snapshot happens in the controller, through the
// eligibility predicates.

use crate::error::CoreError;

/// A validated operator action, dispatched as exactly one remote call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Mark a member failed. `device: None` lets the service pick the
    /// member it already considers faulty.
    MarkDeviceFailed {
        array: String,
        device: Option<String>,
    },
    StartRebuild {
        array: String,
        device: String,
    },
    FinalizeRebuild {
        array: String,
    },
    /// Direction is derived from the current snapshot: no bitmap → enable.
    ToggleBitmap {
        array: String,
    },
    TriggerScrub {
        array: String,
    },
    AddSpare {
        array: String,
        device: String,
    },
    RemoveDevice {
        array: String,
        device: String,
    },
    SetWriteMostly {
        array: String,
        device: String,
        enabled: bool,
    },
    SetSpeedLimits {
        minimum: Option<u64>,
        maximum: Option<u64>,
    },
    DeleteArray {
        array: String,
        force: bool,
    },
    FormatDisk {
        disk: String,
        filesystem: String,
        label: Option<String>,
    },
    CreateArray {
        disks: Vec<String>,
        level: String,
    },
    CreateCache {
        array: String,
        disks: Vec<String>,
    },
}

/// What happened to a dispatched command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// The service accepted the command; `message` is its status text.
    Applied { message: String },
    /// The operator declined the confirmation prompt. Nothing was sent.
    Declined,
}

impl Command {
    /// Short name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MarkDeviceFailed { .. } => "mark-device-failed",
            Self::StartRebuild { .. } => "start-rebuild",
            Self::FinalizeRebuild { .. } => "finalize-rebuild",
            Self::ToggleBitmap { .. } => "toggle-bitmap",
            Self::TriggerScrub { .. } => "trigger-scrub",
            Self::AddSpare { .. } => "add-spare",
            Self::RemoveDevice { .. } => "remove-device",
            Self::SetWriteMostly { .. } => "set-write-mostly",
            Self::SetSpeedLimits { .. } => "set-speed-limits",
            Self::DeleteArray { .. } => "delete-array",
            Self::FormatDisk { .. } => "format-disk",
            Self::CreateArray { .. } => "create-array",
            Self::CreateCache { .. } => "create-cache",
        }
    }

    /// Local preconditions, checked before any gate acquisition or
    /// remote call. A failure here never notifies the outcome sinks;
    /// the validation message itself is the only feedback.
    pub fn validate_input(&self) -> Result<(), CoreError> {
        match self {
            Self::AddSpare { device, .. } => {
                if device.trim().is_empty() {
                    return Err(CoreError::ValidationFailed {
                        message: "spare device name must not be blank".into(),
                    });
                }
            }
            Self::SetSpeedLimits { minimum, maximum } => {
                if minimum.is_none() && maximum.is_none() {
                    return Err(CoreError::ValidationFailed {
                        message: "provide at least one of minimum or maximum speed".into(),
                    });
                }
            }
            Self::FormatDisk { filesystem, .. } => {
                if filesystem.trim().is_empty() {
                    return Err(CoreError::ValidationFailed {
                        message: "filesystem must not be blank".into(),
                    });
                }
            }
            Self::CreateArray { disks, .. } => {
                if disks.len() < 2 {
                    return Err(CoreError::ValidationFailed {
                        message: "creating an array requires at least two disks".into(),
                    });
                }
            }
            Self::CreateCache { disks, .. } => {
                if disks.is_empty() {
                    return Err(CoreError::ValidationFailed {
                        message: "select at least one cache disk".into(),
                    });
                }
            }
            _ => {}
        }
        Ok(())
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_spare_name_rejected() {
        let cmd = Command::AddSpare {
            array: "tank".into(),
            device: "   ".into(),
        };
        assert!(matches!(
            cmd.validate_input(),
            Err(CoreError::ValidationFailed { .. })
        ));
    }

    #[test]
    fn speed_limits_need_at_least_one_value() {
        let cmd = Command::SetSpeedLimits {
            minimum: None,
            maximum: None,
        };
        assert!(matches!(
            cmd.validate_input(),
            Err(CoreError::ValidationFailed { .. })
        ));

        let cmd = Command::SetSpeedLimits {
            minimum: Some(1_000),
            maximum: None,
        };
        assert!(cmd.validate_input().is_ok());

        let cmd = Command::SetSpeedLimits {
            minimum: None,
            maximum: Some(200_000),
        };
        assert!(cmd.validate_input().is_ok());
    }

    #[test]
    fn create_array_needs_two_disks() {
        let cmd = Command::CreateArray {
            disks: vec!["sdd".into()],
            level: "raid1".into(),
        };
        assert!(matches!(
            cmd.validate_input(),
            Err(CoreError::ValidationFailed { .. })
        ));
    }

    #[test]
    fn plain_commands_pass_input_validation() {
        let cmd = Command::StartRebuild {
            array: "tank".into(),
            device: "sdb".into(),
        };
        assert!(cmd.validate_input().is_ok());
    }
}
