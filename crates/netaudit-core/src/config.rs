// ── Runtime monitor configuration ──
//
// These types describe *how* to talk to an audit service. They never
// touch disk: the CLI builds a `MonitorConfig` and hands it in.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::audit_log::LOG_CAPACITY;

/// Default period between snapshot polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1500);

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (self-signed certs).
    DangerAcceptInvalid,
}

/// Which command surface the audit service exposes.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum CommandStyle {
    /// `POST /device_action` with `{ ip, action, limit? }`; supports limits.
    #[default]
    Unified,
    /// `POST /device/{ip}/block|unblock`; no limit support.
    PerDevice,
}

/// Configuration for monitoring a single audit service.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Service base URL (e.g., `http://127.0.0.1:5000/api`).
    pub url: Url,
    /// TLS verification strategy.
    pub tls: TlsVerification,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Period between snapshot polls.
    pub poll_interval: Duration,
    /// Command surface used for block/unblock/limit.
    pub command_style: CommandStyle,
    /// Maximum number of retained audit log entries.
    pub log_capacity: usize,
}

impl MonitorConfig {
    /// A config for `url` with every other field at its default.
    pub fn new(url: Url) -> Self {
        Self {
            url,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(10),
            poll_interval: DEFAULT_POLL_INTERVAL,
            command_style: CommandStyle::default(),
            log_capacity: LOG_CAPACITY,
        }
    }
}
