// ── Core error types ──
//
// User-facing errors from netaudit-core. Consumers never see HTTP status
// codes or JSON parse failures directly: poll-path and action-path
// failures are folded into `PollFailed` / `MalformedSnapshot` and
// `ActionFailed`, and the `From<netaudit_api::Error>` impl covers the rest.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach audit service at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Audit service request timed out")]
    Timeout,

    // ── Poll path ────────────────────────────────────────────────────
    #[error("Snapshot poll failed: {reason}")]
    PollFailed { reason: String },

    #[error("Malformed snapshot: {message}")]
    MalformedSnapshot { message: String },

    // ── Action path ──────────────────────────────────────────────────
    #[error("Action '{action}' on {ip} failed: {reason}")]
    ActionFailed {
        action: String,
        ip: String,
        reason: String,
    },

    #[error("Device not found: {identifier}")]
    DeviceNotFound { identifier: String },

    #[error("Operation not supported: {operation} (requires {required})")]
    Unsupported { operation: String, required: String },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    /// Fold a fetch failure into the poll-path taxonomy.
    pub(crate) fn poll(err: netaudit_api::Error) -> Self {
        match err {
            netaudit_api::Error::Deserialization { message, .. } => {
                Self::MalformedSnapshot { message }
            }
            other => Self::PollFailed {
                reason: other.to_string(),
            },
        }
    }

    /// Fold a command failure into the action-path taxonomy.
    pub(crate) fn action(action: &str, ip: impl ToString, err: &netaudit_api::Error) -> Self {
        Self::ActionFailed {
            action: action.to_owned(),
            ip: ip.to_string(),
            reason: err.to_string(),
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<netaudit_api::Error> for CoreError {
    fn from(err: netaudit_api::Error) -> Self {
        match err {
            netaudit_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            netaudit_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            netaudit_api::Error::Tls(msg) => CoreError::Config {
                message: format!("TLS error: {msg}"),
            },
            netaudit_api::Error::Http { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            netaudit_api::Error::Rejected { message } => CoreError::Api {
                message,
                status: None,
            },
            netaudit_api::Error::Deserialization { message, body: _ } => {
                CoreError::MalformedSnapshot { message }
            }
        }
    }
}
