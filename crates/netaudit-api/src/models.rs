// Wire types for the audit service.
//
// These mirror the JSON the service actually emits, including its quirks
// (mixed camelCase / snake_case keys, `last_port` as number or empty string).
// Everything except `devices` and `ip` is optional here; `netaudit-core`
// decides what an absent value means.

use serde::{Deserialize, Deserializer, Serialize};

// ── GET /network_status ─────────────────────────────────────────────

/// Body of `GET /network_status`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NetworkStatusResponse {
    pub devices: Vec<RawDevice>,
    #[serde(default)]
    pub status: Option<RawAuditStatus>,
}

/// Global audit-service flags carried next to the device list.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAuditStatus {
    #[serde(default)]
    pub is_attack_mode: Option<bool>,
    #[serde(default)]
    pub attacker_ip: Option<String>,
    #[serde(default)]
    pub simulating: Option<bool>,
    #[serde(default)]
    pub is_running: Option<bool>,
}

/// One monitored device as reported by the service.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDevice {
    #[serde(default)]
    pub id: Option<String>,
    pub ip: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, alias = "packetsSent")]
    pub packet_count: Option<u64>,
    #[serde(default, alias = "packetRateLimit")]
    pub packet_limit: Option<u64>,
    #[serde(default)]
    pub recent_packet_history: Option<Vec<u64>>,
    #[serde(default)]
    pub recent_bandwidth_rate: Option<Vec<f64>>,
    #[serde(default, rename = "last_protocol")]
    pub last_protocol: Option<String>,
    #[serde(default, rename = "last_port", deserialize_with = "lenient_port")]
    pub last_port: Option<u16>,
    #[serde(default, rename = "is_local")]
    pub is_local: Option<bool>,
    #[serde(default)]
    pub mac_address: Option<String>,
    #[serde(default)]
    pub manufacturer: Option<String>,
    #[serde(default)]
    pub device_type: Option<String>,
    #[serde(default, rename = "os_fingerprint")]
    pub os_fingerprint: Option<String>,
    #[serde(default, rename = "last_visited_domain")]
    pub last_visited_domain: Option<String>,
}

/// The service emits `last_port` as a number, a numeric string, `""`
/// (no transport layer seen) or `null`.
fn lenient_port<'de, D>(deserializer: D) -> Result<Option<u16>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Port {
        Number(u64),
        Text(String),
    }

    Ok(match Option::<Port>::deserialize(deserializer)? {
        Some(Port::Number(n)) => u16::try_from(n).ok(),
        Some(Port::Text(s)) => s.trim().parse().ok(),
        None => None,
    })
}

// ── POST /device_action ─────────────────────────────────────────────

/// Action verb understood by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Block,
    Unblock,
    Limit,
}

impl ActionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Block => "block",
            Self::Unblock => "unblock",
            Self::Limit => "limit",
        }
    }
}

/// Body of `POST /device_action`.
#[derive(Debug, Clone, Serialize)]
pub struct DeviceActionRequest {
    pub ip: String,
    pub action: ActionKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
}

/// Acknowledgment of `POST /device_action`.
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceActionResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub device: Option<DeviceAck>,
    #[serde(default)]
    pub message: Option<String>,
}

/// The authoritative subset of a device returned after an action.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceAck {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, alias = "packetRateLimit")]
    pub packet_limit: Option<u64>,
}

// ── POST /reset, POST /device/{ip}/{action} ─────────────────────────

/// Generic `{ message }` acknowledgment.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}
