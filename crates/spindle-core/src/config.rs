// Controller configuration.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use url::Url;

/// How often the array-status poller fires.
pub const STATUS_POLL_INTERVAL: Duration = Duration::from_millis(8_000);

/// How often the disk-inventory poller fires. Independent of the status
/// poller; the inventory changes far less often.
pub const DISK_POLL_INTERVAL: Duration = Duration::from_millis(30_000);

/// TLS verification policy for the appliance connection.
#[derive(Debug, Clone)]
pub enum TlsVerification {
    /// Use the system certificate store.
    SystemDefaults,
    /// Trust a custom CA certificate (PEM file).
    CustomCa(PathBuf),
    /// Accept any certificate (self-signed appliances).
    DangerAcceptInvalid,
}

/// Configuration for an [`ArrayController`](crate::ArrayController).
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Appliance base URL, e.g. `https://nas.local:8443`.
    pub url: Url,

    /// API token for the array-management service, if required.
    pub api_token: Option<SecretString>,

    pub tls: TlsVerification,

    /// Per-request transport timeout. Also bounds mutating calls, so a
    /// hung service releases the action gate when the request times out.
    pub timeout: Duration,

    pub status_poll_interval: Duration,
    pub disk_poll_interval: Duration,
}

impl ControllerConfig {
    /// Config with default timings for the given appliance URL.
    pub fn new(url: Url) -> Self {
        Self {
            url,
            api_token: None,
            tls: TlsVerification::SystemDefaults,
            timeout: Duration::from_secs(30),
            status_poll_interval: STATUS_POLL_INTERVAL,
            disk_poll_interval: DISK_POLL_INTERVAL,
        }
    }
}
