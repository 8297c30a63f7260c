mod cli;
mod commands;
mod error;
mod output;

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use secrecy::SecretString;
use tracing_subscriber::EnvFilter;

use spindle_core::{ArrayController, ConfirmPrompt, ControllerConfig, Notifier, TlsVerification};

use crate::cli::{Cli, Command};
use crate::commands::util::{CliConfirm, ConsoleNotifier};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Config inspection doesn't need an appliance connection
        Command::Config(args) => commands::handle_config(&args),

        // Shell completions generation
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "spindle", &mut std::io::stdout());
            Ok(())
        }

        // All other commands talk to the appliance
        cmd => {
            let controller_config = build_controller_config(&cli.global)?;

            let notifier: Arc<dyn Notifier> = Arc::new(ConsoleNotifier {
                quiet: cli.global.quiet,
                color: output::should_color(&cli.global.color),
            });
            let confirm: Arc<dyn ConfirmPrompt> = Arc::new(CliConfirm { yes: cli.global.yes });

            // `watch` mounts a live view and fetches on activation; every
            // other command wants one up-front snapshot fetch.
            let controller = if matches!(cmd, Command::Watch) {
                ArrayController::new(controller_config, notifier, confirm)?
            } else {
                ArrayController::oneshot(controller_config, notifier, confirm).await?
            };

            tracing::debug!(command = ?cmd, "dispatching command");
            commands::dispatch(cmd, &controller, &cli.global).await
        }
    }
}

/// Build a `ControllerConfig` from the config file, profile, and CLI
/// overrides (flags win over profile values).
fn build_controller_config(global: &cli::GlobalOpts) -> Result<ControllerConfig, CliError> {
    let file_config = match spindle_config::load_config() {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(error = %e, "config unreadable, using defaults");
            spindle_config::Config::default()
        }
    };

    let mut config = if let Some(ref url_str) = global.appliance {
        // Flags/env alone are enough -- no profile required.
        let url: url::Url = url_str.parse().map_err(|_| CliError::Validation {
            message: format!("invalid appliance URL: {url_str}"),
        })?;
        ControllerConfig::new(url)
    } else {
        match spindle_config::resolve_profile(&file_config, global.profile.as_deref()) {
            Ok((name, config)) => {
                tracing::debug!(profile = %name, "using profile");
                config
            }
            Err(spindle_config::ConfigError::UnknownProfile { .. }) => {
                return Err(CliError::NoConfig {
                    path: spindle_config::config_path().display().to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        }
    };

    if let Some(ref token) = global.api_token {
        config.api_token = Some(SecretString::from(token.clone()));
    }
    if global.insecure {
        config.tls = TlsVerification::DangerAcceptInvalid;
    }
    config.timeout = Duration::from_secs(global.timeout);

    Ok(config)
}
