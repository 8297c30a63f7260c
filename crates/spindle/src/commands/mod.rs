//! Command handlers, one module per resource.

pub mod arrays;
pub mod disks;
pub mod util;
pub mod watch;

use spindle_core::ArrayController;

use crate::cli::{Command, ConfigArgs, ConfigCommand, GlobalOpts};
use crate::error::CliError;

/// Dispatch a connected command to its handler.
pub async fn dispatch(
    cmd: Command,
    controller: &ArrayController,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Status(args) => arrays::handle_status(controller, &args, global),
        Command::Disks => disks::handle_list(controller, global),
        Command::Array(args) => arrays::handle(controller, args, global).await,
        Command::Disk(args) => disks::handle(controller, args, global).await,
        Command::Refresh => {
            controller.refresh_now().await;
            Ok(())
        }
        Command::Watch => watch::handle(controller, global).await,
        // Handled before a controller exists.
        Command::Config(_) | Command::Completions(_) => unreachable!("handled in main"),
    }
}

/// `spindle config` -- inspection only, no connection needed.
pub fn handle_config(args: &ConfigArgs) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            println!("{}", spindle_config::config_path().display());
            Ok(())
        }
        ConfigCommand::Show => {
            let mut config = spindle_config::load_config()?;
            // Never echo credentials back to the terminal.
            for profile in config.profiles.values_mut() {
                if profile.api_token.is_some() {
                    profile.api_token = Some("<redacted>".into());
                }
            }
            let rendered = toml::to_string_pretty(&config)
                .map_err(spindle_config::ConfigError::Serialization)?;
            println!("{rendered}");
            Ok(())
        }
    }
}
