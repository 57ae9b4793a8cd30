//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with help text.

use miette::Diagnostic;
use thiserror::Error;

use netaudit_config::ConfigError;
use netaudit_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const UNSUPPORTED: i32 = 5;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to audit service at {url}")]
    #[diagnostic(
        code(netaudit::connection_failed),
        help(
            "Check that the audit service is running and reachable.\n\
             Reason: {reason}"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Lost connection to the audit service")]
    #[diagnostic(
        code(netaudit::disconnected),
        help("Reason: {reason}\nPolling has stopped; run the command again to restart it.")
    )]
    Disconnected { reason: String },

    #[error("Request to the audit service timed out")]
    #[diagnostic(
        code(netaudit::timeout),
        help("Increase the timeout with --timeout or check the service's responsiveness.")
    )]
    Timeout,

    #[error("Audit service sent an unusable snapshot: {message}")]
    #[diagnostic(
        code(netaudit::malformed),
        help("Check that --url points at the service's API prefix (e.g. http://host:5000/api).")
    )]
    MalformedSnapshot { message: String },

    // ── Actions ──────────────────────────────────────────────────────
    #[error("Could not {action} {ip}")]
    #[diagnostic(code(netaudit::action_failed), help("{reason}"))]
    ActionFailed {
        action: String,
        ip: String,
        reason: String,
    },

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(netaudit::not_found),
        help("Run: netaudit {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("Operation '{operation}' is not supported by this service")]
    #[diagnostic(
        code(netaudit::unsupported),
        help("This command requires {required}.\nSet command_style in your profile or pass --command-style.")
    )]
    Unsupported { operation: String, required: String },

    #[error("API error: {message}")]
    #[diagnostic(code(netaudit::api_error))]
    ApiError { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(netaudit::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(netaudit::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: netaudit config init --name {name}"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No audit service configured")]
    #[diagnostic(
        code(netaudit::no_config),
        help(
            "Pass --url, set NETAUDIT_URL, or create a profile with: netaudit config init\n\
             Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error("Configuration file already exists at {path}")]
    #[diagnostic(code(netaudit::config_exists), help("Use --force to overwrite it."))]
    ConfigExists { path: String },

    #[error(transparent)]
    #[diagnostic(code(netaudit::config))]
    Config(ConfigError),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::Disconnected { .. } | Self::MalformedSnapshot { .. } => {
                exit_code::CONNECTION
            }
            Self::Timeout => exit_code::TIMEOUT,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Unsupported { .. } => exit_code::UNSUPPORTED,
            Self::Validation { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            other => Self::Config(other),
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => Self::ConnectionFailed { url, reason },

            CoreError::Timeout => Self::Timeout,

            CoreError::PollFailed { reason } => Self::Disconnected { reason },

            CoreError::MalformedSnapshot { message } => Self::MalformedSnapshot { message },

            CoreError::ActionFailed { action, ip, reason } => Self::ActionFailed { action, ip, reason },

            CoreError::DeviceNotFound { identifier } => Self::NotFound {
                resource_type: "device".into(),
                identifier,
                list_command: "devices list".into(),
            },

            CoreError::Unsupported {
                operation,
                required,
            } => Self::Unsupported {
                operation,
                required,
            },

            CoreError::ValidationFailed { message } => Self::Validation {
                field: "input".into(),
                reason: message,
            },

            CoreError::Api { message, status } => Self::ApiError {
                message: match status {
                    Some(code) => format!("HTTP {code}: {message}"),
                    None => message,
                },
            },

            CoreError::Config { message } => Self::Validation {
                field: "config".into(),
                reason: message,
            },
        }
    }
}
