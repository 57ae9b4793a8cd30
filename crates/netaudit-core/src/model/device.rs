// ── Device domain types ──

use std::net::IpAddr;

use serde::{Deserialize, Serialize};

/// Packet limit applied when the service does not report one.
pub const DEFAULT_PACKET_LIMIT: u64 = 1500;

/// Number of per-cycle samples in the sliding detection window.
pub const HISTORY_WINDOW: usize = 5;

/// Containment status of a monitored device.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum DeviceStatus {
    Connected,
    Alert,
    Blocked,
    Unknown,
}

impl DeviceStatus {
    /// Parse the service's status string. Absent or unrecognized values
    /// become [`DeviceStatus::Unknown`].
    pub fn from_wire(raw: Option<&str>) -> Self {
        raw.and_then(|s| s.trim().parse().ok())
            .unwrap_or(Self::Unknown)
    }

    pub fn is_blocked(self) -> bool {
        matches!(self, Self::Blocked)
    }
}

/// Display-only identity and metadata. Never consulted by reconciliation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceIdentity {
    pub last_protocol: Option<String>,
    pub last_port: Option<u16>,
    pub is_local: bool,
    pub mac_address: Option<String>,
    pub manufacturer: Option<String>,
    pub device_type: Option<String>,
    pub os_fingerprint: Option<String>,
    pub last_visited_domain: Option<String>,
}

/// A monitored network device, keyed by `ip` within a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    /// Display name assigned by the audit service.
    pub id: String,
    pub ip: IpAddr,
    pub status: DeviceStatus,
    /// Total packets seen; `None` when the service omits it.
    pub packet_count: Option<u64>,
    pub packet_limit: u64,
    /// Newest sample last; at most [`HISTORY_WINDOW`] entries.
    pub recent_packet_history: Vec<u64>,
    /// Newest sample last; at most [`HISTORY_WINDOW`] entries.
    pub recent_bandwidth_rate: Vec<f64>,
    pub identity: DeviceIdentity,
}

impl Device {
    /// Packets observed across the sliding window.
    pub fn current_rate(&self) -> u64 {
        self.recent_packet_history.iter().sum()
    }

    pub fn is_blocked(&self) -> bool {
        self.status.is_blocked()
    }

    /// Protocol of the most recent packet, or `N/A`.
    pub fn protocol_label(&self) -> &str {
        self.identity.last_protocol.as_deref().unwrap_or("N/A")
    }
}
