//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` variants into user-facing errors with actionable
//! help text and distinct exit codes.

use miette::Diagnostic;
use thiserror::Error;

use spindle_core::CoreError;

/// Exit codes, one per error class.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const BUSY: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    #[error("No appliance configured")]
    #[diagnostic(
        code(spindle::no_config),
        help(
            "Pass --appliance <url>, set SPINDLE_APPLIANCE, or create a profile in {path}"
        )
    )]
    NoConfig { path: String },

    #[error("Configuration error: {0}")]
    #[diagnostic(code(spindle::config))]
    Config(#[from] spindle_config::ConfigError),

    #[error("Could not connect to appliance at {url}")]
    #[diagnostic(
        code(spindle::connection_failed),
        help(
            "Check that the appliance is running and accessible.\n\
             For self-signed certificates, pass --insecure (-k)."
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(spindle::auth_failed),
        help("Verify the API token (SPINDLE_API_TOKEN or the profile's api_token).")
    )]
    AuthFailed { message: String },

    #[error("{entity} '{identifier}' not found")]
    #[diagnostic(
        code(spindle::not_found),
        help("List known entities with: spindle status / spindle disks")
    )]
    NotFound { entity: String, identifier: String },

    #[error("Another operation is already in progress")]
    #[diagnostic(
        code(spindle::busy),
        help("Wait for the in-flight operation to finish, then retry.")
    )]
    Busy,

    #[error("{message}")]
    #[diagnostic(code(spindle::validation))]
    Validation { message: String },

    #[error(transparent)]
    #[diagnostic(code(spindle::core))]
    Core(CoreError),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NoConfig { .. } | Self::Config(_) | Self::Validation { .. } => exit_code::USAGE,
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Busy => exit_code::BUSY,
            Self::Core(CoreError::Timeout { .. }) => exit_code::TIMEOUT,
            _ => exit_code::GENERAL,
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => Self::ConnectionFailed { url, reason },
            CoreError::AuthenticationFailed { message } => Self::AuthFailed { message },
            CoreError::NotFound { entity, identifier } => Self::NotFound { entity, identifier },
            CoreError::Busy => Self::Busy,
            CoreError::ValidationFailed { message } => Self::Validation { message },
            CoreError::NotAllowed { action, reason } => Self::Validation {
                message: format!("{action} not allowed: {reason}"),
            },
            other => Self::Core(other),
        }
    }
}
