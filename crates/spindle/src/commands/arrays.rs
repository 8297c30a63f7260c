//! Array command handlers: status views and mutating operations.

use tabled::Tabled;

use spindle_core::{
    ArrayController, ArrayMember, Command as CoreCommand, CommandOutcome, RaidArray, eligibility,
};

use crate::cli::{ArrayArgs, ArrayCommand, GlobalOpts, StatusArgs};
use crate::error::CliError;
use crate::output;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct ArrayRow {
    #[tabled(rename = "Array")]
    name: String,
    #[tabled(rename = "Level")]
    level: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Size")]
    size: String,
    #[tabled(rename = "Progress")]
    progress: String,
    #[tabled(rename = "Devices")]
    devices: String,
    #[tabled(rename = "Cache")]
    cache: String,
}

fn array_row(array: &RaidArray, color: bool) -> ArrayRow {
    ArrayRow {
        name: array.name.clone(),
        level: array.level.clone(),
        status: output::paint_status(&array.status, color),
        size: output::fmt_bytes(array.size_bytes),
        progress: array
            .resync_progress
            .map_or_else(|| "-".into(), |p| format!("{p:.1}%")),
        devices: array.devices.len().to_string(),
        cache: array
            .cache
            .as_ref()
            .map_or_else(|| "-".into(), |c| c.name.clone()),
    }
}

/// Actions the classifier currently permits for a member device.
fn device_actions(device: &ArrayMember) -> Vec<&'static str> {
    let mut actions = Vec::new();
    if eligibility::can_start_rebuild(device) {
        actions.push("rebuild");
    }
    if eligibility::can_mark_failed(device) {
        actions.push("fail");
    }
    if eligibility::can_toggle_write_mostly(device) {
        actions.push("write-mostly");
    }
    if eligibility::can_remove_spare(device) {
        actions.push("spare-remove");
    }
    actions
}

fn detail(array: &RaidArray, color: bool) -> String {
    let mut lines = vec![
        format!("Array:    {}", array.name),
        format!("Level:    {}", array.level),
        format!("Status:   {}", output::paint_status(&array.status, color)),
        format!("Size:     {}", output::fmt_bytes(array.size_bytes)),
        format!("Bitmap:   {}", array.bitmap.as_deref().unwrap_or("-")),
        format!("Sync:     {}", array.sync_action.as_deref().unwrap_or("-")),
        format!(
            "Progress: {}",
            array
                .resync_progress
                .map_or_else(|| "-".into(), |p| format!("{p:.1}%"))
        ),
        format!(
            "Cache:    {}",
            array
                .cache
                .as_ref()
                .map_or_else(|| "-".into(), |c| c.name.clone())
        ),
        "Devices:".into(),
    ];
    for device in &array.devices {
        let actions = device_actions(device);
        let actions = if actions.is_empty() {
            String::new()
        } else {
            format!("  [{}]", actions.join(", "))
        };
        lines.push(format!(
            "  {:<12} {}{}",
            device.name,
            output::paint_member_state(&device.state, color),
            actions
        ));
    }
    if eligibility::should_offer_finalize(array) {
        lines.push("Finalize: available".into());
    }
    lines.join("\n")
}

// ── Status handler ──────────────────────────────────────────────────

pub fn handle_status(
    controller: &ArrayController,
    args: &StatusArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let snapshot = controller
        .status_snapshot()
        .ok_or(CliError::Core(spindle_core::CoreError::NoSnapshot))?;
    let color = output::should_color(&global.color);

    match &args.array {
        Some(name) => {
            let array = snapshot.array(name).ok_or_else(|| CliError::NotFound {
                entity: "array".into(),
                identifier: name.clone(),
            })?;
            let out = output::render_single(
                &global.output,
                array,
                |a| detail(a, color),
                |a| a.name.clone(),
            );
            output::print_output(&out, global.quiet);
        }
        None => {
            let out = output::render_list(
                &global.output,
                &snapshot.arrays,
                |a| array_row(a, color),
                |a| a.name.clone(),
            );
            output::print_output(&out, global.quiet);
            if !global.quiet {
                let limits = &snapshot.speed_limits;
                if limits.minimum.is_some() || limits.maximum.is_some() {
                    eprintln!(
                        "Sync speed limits: min {} kB/s, max {} kB/s",
                        limits.minimum.map_or_else(|| "-".into(), |v| v.to_string()),
                        limits.maximum.map_or_else(|| "-".into(), |v| v.to_string()),
                    );
                }
            }
        }
    }
    Ok(())
}

// ── Mutation handler ────────────────────────────────────────────────

pub async fn handle(
    controller: &ArrayController,
    args: ArrayArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let cmd = match args.command {
        ArrayCommand::Rebuild { array, device } => CoreCommand::StartRebuild { array, device },
        ArrayCommand::Fail { array, device } => CoreCommand::MarkDeviceFailed { array, device },
        ArrayCommand::Finalize { array } => CoreCommand::FinalizeRebuild { array },
        ArrayCommand::Bitmap { array } => CoreCommand::ToggleBitmap { array },
        ArrayCommand::Scrub { array } => CoreCommand::TriggerScrub { array },
        ArrayCommand::SpareAdd { array, device } => CoreCommand::AddSpare { array, device },
        ArrayCommand::SpareRemove { array, device } => {
            CoreCommand::RemoveDevice { array, device }
        }
        ArrayCommand::WriteMostly { array, device, off } => CoreCommand::SetWriteMostly {
            array,
            device,
            enabled: !off,
        },
        ArrayCommand::Speed { min, max } => CoreCommand::SetSpeedLimits {
            minimum: min,
            maximum: max,
        },
        ArrayCommand::Delete { array, force } => CoreCommand::DeleteArray { array, force },
        ArrayCommand::Create { disks, level } => CoreCommand::CreateArray { disks, level },
        ArrayCommand::CacheCreate { array, disks } => CoreCommand::CreateCache { array, disks },
    };

    match controller.execute(cmd).await? {
        CommandOutcome::Applied { .. } => Ok(()),
        CommandOutcome::Declined => {
            if !global.quiet {
                eprintln!("Cancelled");
            }
            Ok(())
        }
    }
}
