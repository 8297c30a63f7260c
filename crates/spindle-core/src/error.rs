// ── Core error types ──
//
// User-facing errors from spindle-core. These are NOT API-specific --
// consumers never see HTTP status codes or JSON parse failures directly.
// The `From<spindle_api::Error>` impl translates transport-layer errors
// into domain-appropriate variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach appliance at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("{entity} not found: {identifier}")]
    NotFound { entity: String, identifier: String },

    #[error("No status snapshot available yet -- refresh and retry")]
    NoSnapshot,

    // ── Operation errors ─────────────────────────────────────────────
    /// Another mutating operation already holds the action gate.
    #[error("Another operation is already in progress")]
    Busy,

    /// The current state forbids this action (dispatcher re-validation).
    #[error("{action} not allowed: {reason}")]
    NotAllowed { action: String, reason: String },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    // ── Service errors (wrapped, not exposed raw) ────────────────────
    #[error("Service error: {message}")]
    Service {
        message: String,
        /// Optional human-readable diagnostic from the service.
        detail: Option<String>,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Text for the operator notification sink: the service's diagnostic
    /// detail when present, otherwise the error's display form.
    pub fn operator_message(&self) -> String {
        match self {
            Self::Service {
                message, detail, ..
            } => detail.clone().unwrap_or_else(|| message.clone()),
            other => other.to_string(),
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<spindle_api::Error> for CoreError {
    fn from(err: spindle_api::Error) -> Self {
        match err {
            spindle_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            spindle_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: 0 }
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map(|u| u.to_string())
                            .unwrap_or_else(|| "<unknown>".into()),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Service {
                        message: e.to_string(),
                        detail: None,
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            spindle_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            spindle_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            spindle_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            spindle_api::Error::Service {
                message,
                detail,
                status,
            } => CoreError::Service {
                message,
                detail,
                status: Some(status),
            },
            spindle_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}
