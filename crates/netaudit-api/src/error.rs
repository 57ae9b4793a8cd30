use thiserror::Error;

/// Top-level error type for the `netaudit-api` crate.
///
/// Covers every failure mode of the audit service surface: transport,
/// non-success HTTP responses, malformed bodies, and explicit rejections.
/// `netaudit-core` folds these into poll and action failures.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Service responses ───────────────────────────────────────────
    /// The service answered with a non-success HTTP status.
    #[error("Audit service returned HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// The service answered 2xx but flagged the request as unsuccessful
    /// (`{"success": false, "message": "..."}`).
    #[error("Audit service rejected the request: {message}")]
    Rejected { message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::Http { status: 404, .. } => true,
            _ => false,
        }
    }
}
