// ── Audit log entry ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How newsworthy an entry is.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
    Normal,
    Warning,
    Critical,
}

/// One immutable audit log record.
///
/// `timestamp` is for display only; ordering is the log's insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub message: String,
    pub severity: Severity,
}

impl LogEntry {
    pub fn new(severity: Severity, message: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            message: message.into(),
            severity,
        }
    }

    pub fn normal(message: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self::new(Severity::Normal, message, timestamp)
    }

    pub fn warning(message: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self::new(Severity::Warning, message, timestamp)
    }

    pub fn critical(message: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self::new(Severity::Critical, message, timestamp)
    }
}
