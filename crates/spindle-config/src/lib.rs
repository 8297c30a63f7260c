//! Shared configuration for the spindle CLI.
//!
//! TOML profiles, environment overrides, and translation to
//! `spindle_core::ControllerConfig`. Credentials resolve from the
//! profile file or the `SPINDLE_API_TOKEN` environment variable.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use spindle_core::{ControllerConfig, TlsVerification};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no profile named '{profile}'")]
    UnknownProfile { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named appliance profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default)]
    pub insecure: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            insecure: false,
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_timeout() -> u64 {
    30
}

/// A named appliance profile.
#[derive(Debug, Deserialize, Serialize)]
pub struct Profile {
    /// Appliance base URL (e.g., "https://nas.local:8443").
    pub appliance: String,

    /// API token for the array-management service. Prefer the
    /// `SPINDLE_API_TOKEN` environment variable for shared machines.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,

    /// Accept the appliance's self-signed certificate.
    #[serde(default)]
    pub insecure: bool,

    /// Path to a custom CA certificate (PEM).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,

    /// Request timeout in seconds (overrides defaults.timeout).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    /// Array-status poll period in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_poll_ms: Option<u64>,

    /// Disk-inventory poll period in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disk_poll_ms: Option<u64>,
}

// ── Loading ─────────────────────────────────────────────────────────

/// Path of the user config file (`~/.config/spindle/config.toml` on
/// Linux).
pub fn config_path() -> PathBuf {
    ProjectDirs::from("", "", "spindle")
        .map(|dirs| dirs.config_dir().join("config.toml"))
        .unwrap_or_else(|| PathBuf::from("spindle.toml"))
}

/// Load configuration: defaults, then the TOML file, then `SPINDLE_*`
/// environment variables (highest precedence).
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load configuration from an explicit file path (tests, `--config`).
pub fn load_config_from(path: &std::path::Path) -> Result<Config, ConfigError> {
    let config = Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("SPINDLE_").split("__"))
        .extract()?;
    Ok(config)
}

/// Resolve a profile (by name, or the configured default) into a
/// [`ControllerConfig`].
pub fn resolve_profile(
    config: &Config,
    profile_name: Option<&str>,
) -> Result<(String, ControllerConfig), ConfigError> {
    let name = profile_name
        .map(ToOwned::to_owned)
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into());

    let profile = config
        .profiles
        .get(&name)
        .ok_or_else(|| ConfigError::UnknownProfile {
            profile: name.clone(),
        })?;

    let url: url::Url = profile
        .appliance
        .parse()
        .map_err(|e| ConfigError::Validation {
            field: "appliance".into(),
            reason: format!("invalid URL '{}': {e}", profile.appliance),
        })?;

    let tls = if let Some(ref ca) = profile.ca_cert {
        TlsVerification::CustomCa(ca.clone())
    } else if profile.insecure || config.defaults.insecure {
        TlsVerification::DangerAcceptInvalid
    } else {
        TlsVerification::SystemDefaults
    };

    let api_token = profile
        .api_token
        .clone()
        .or_else(|| std::env::var("SPINDLE_API_TOKEN").ok())
        .map(SecretString::from);

    let mut controller = ControllerConfig::new(url);
    controller.api_token = api_token;
    controller.tls = tls;
    controller.timeout =
        Duration::from_secs(profile.timeout.unwrap_or(config.defaults.timeout));
    if let Some(ms) = profile.status_poll_ms {
        controller.status_poll_interval = Duration::from_millis(ms);
    }
    if let Some(ms) = profile.disk_poll_ms {
        controller.disk_poll_interval = Duration::from_millis(ms);
    }

    Ok((name, controller))
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn missing_file_yields_defaults() {
        let config = load_config_from(std::path::Path::new("/nonexistent/spindle.toml")).unwrap();
        assert_eq!(config.default_profile.as_deref(), Some("default"));
        assert!(config.profiles.is_empty());
        assert_eq!(config.defaults.timeout, 30);
    }

    #[test]
    fn profile_resolves_to_controller_config() {
        let file = write_config(
            r#"
            default_profile = "home"

            [profiles.home]
            appliance = "https://nas.local:8443"
            api_token = "tok123"
            insecure = true
            timeout = 10
            status_poll_ms = 4000
            "#,
        );

        let config = load_config_from(file.path()).unwrap();
        let (name, controller) = resolve_profile(&config, None).unwrap();

        assert_eq!(name, "home");
        assert_eq!(controller.url.as_str(), "https://nas.local:8443/");
        assert!(controller.api_token.is_some());
        assert!(matches!(
            controller.tls,
            TlsVerification::DangerAcceptInvalid
        ));
        assert_eq!(controller.timeout, Duration::from_secs(10));
        assert_eq!(
            controller.status_poll_interval,
            Duration::from_millis(4000)
        );
        // Unset intervals keep the core defaults.
        assert_eq!(
            controller.disk_poll_interval,
            spindle_core::config::DISK_POLL_INTERVAL
        );
    }

    #[test]
    fn unknown_profile_is_an_error() {
        let config = Config::default();
        let result = resolve_profile(&config, Some("nope"));
        assert!(matches!(
            result,
            Err(ConfigError::UnknownProfile { .. })
        ));
    }

    #[test]
    fn invalid_appliance_url_rejected() {
        let file = write_config(
            r#"
            [profiles.bad]
            appliance = "not a url"
            "#,
        );

        let config = load_config_from(file.path()).unwrap();
        let result = resolve_profile(&config, Some("bad"));
        assert!(matches!(result, Err(ConfigError::Validation { .. })));
    }
}
