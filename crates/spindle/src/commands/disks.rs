//! Disk command handlers: inventory listing and formatting.

use tabled::Tabled;

use spindle_core::{ArrayController, AvailableDisk, Command as CoreCommand, eligibility};

use crate::cli::{DiskArgs, DiskCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct DiskRow {
    #[tabled(rename = "Disk")]
    name: String,
    #[tabled(rename = "Size")]
    size: String,
    #[tabled(rename = "Model")]
    model: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Role")]
    role: String,
    #[tabled(rename = "Formattable")]
    formattable: String,
}

fn disk_row(disk: &AvailableDisk) -> DiskRow {
    let role = if disk.is_os_disk {
        "os"
    } else if disk.in_raid {
        "raid member"
    } else if disk.is_cache_device {
        "cache"
    } else if disk.is_partitioned {
        "partitioned"
    } else {
        "free"
    };
    DiskRow {
        name: disk.name.clone(),
        size: output::fmt_bytes(disk.size_bytes),
        model: disk.model.clone().unwrap_or_default(),
        kind: if disk.is_ssd { "ssd" } else { "hdd" }.into(),
        role: role.into(),
        formattable: if eligibility::can_format(disk) {
            "yes"
        } else {
            "no"
        }
        .into(),
    }
}

// ── Handlers ────────────────────────────────────────────────────────

pub fn handle_list(controller: &ArrayController, global: &GlobalOpts) -> Result<(), CliError> {
    let snapshot = controller
        .disk_snapshot()
        .ok_or(CliError::Core(spindle_core::CoreError::NoSnapshot))?;

    let out = output::render_list(&global.output, &snapshot.disks, disk_row, |d| {
        d.name.clone()
    });
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn handle(
    controller: &ArrayController,
    args: DiskArgs,
    _global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        DiskCommand::Format {
            disk,
            filesystem,
            label,
        } => {
            controller
                .execute(CoreCommand::FormatDisk {
                    disk,
                    filesystem,
                    label,
                })
                .await?;
            Ok(())
        }
    }
}
