use thiserror::Error;

/// Top-level error type for the `spindle-api` crate.
///
/// Covers every failure mode the array-management service can produce:
/// transport, authentication, structured service rejections, and
/// malformed payloads. `spindle-core` maps these into user-facing
/// diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// The service rejected the API token.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Service ─────────────────────────────────────────────────────
    /// Structured rejection from the array-management service.
    ///
    /// `message` is the service's human-readable error; `detail` carries
    /// the optional diagnostic text. Both are opaque display strings,
    /// never machine-parsed.
    #[error("Service error (HTTP {status}): {message}")]
    Service {
        message: String,
        detail: Option<String>,
        status: u16,
    },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this is a transient error worth retrying on the
    /// next poll cycle.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Timeout { .. } => true,
            _ => false,
        }
    }

    /// The display text preferred for operator notifications: the
    /// service's `detail` when present, otherwise its `message`.
    pub fn display_detail(&self) -> Option<&str> {
        match self {
            Self::Service {
                message, detail, ..
            } => Some(detail.as_deref().unwrap_or(message)),
            _ => None,
        }
    }
}
