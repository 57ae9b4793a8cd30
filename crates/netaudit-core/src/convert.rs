// ── API-to-domain type conversions ──
//
// Bridges raw `netaudit_api` response types into canonical
// `netaudit_core::model` domain types. Required fields (`devices`, `ip`)
// that are absent or unparseable make the whole snapshot malformed;
// optional fields fall back to "unknown" or documented defaults.

use std::collections::HashSet;
use std::net::IpAddr;

use netaudit_api::{DeviceAck, NetworkStatusResponse, RawDevice};

use crate::error::CoreError;
use crate::model::{
    DEFAULT_PACKET_LIMIT, Device, DeviceIdentity, DeviceStatus, HISTORY_WINDOW, Snapshot,
};

// ── Helpers ────────────────────────────────────────────────────────

/// Keep only the newest `HISTORY_WINDOW` samples (newest is last).
fn trim_window<T>(mut samples: Vec<T>) -> Vec<T> {
    if samples.len() > HISTORY_WINDOW {
        samples.drain(..samples.len() - HISTORY_WINDOW);
    }
    samples
}

/// Private, loopback and link-local addresses count as local.
fn is_local_address(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => v4.is_private() || v4.is_loopback() || v4.is_link_local(),
        IpAddr::V6(v6) => v6.is_loopback() || v6.is_unique_local() || v6.is_unicast_link_local(),
    }
}

fn non_empty(raw: Option<String>) -> Option<String> {
    raw.filter(|s| !s.trim().is_empty())
}

// ── Device ─────────────────────────────────────────────────────────

impl TryFrom<RawDevice> for Device {
    type Error = CoreError;

    fn try_from(raw: RawDevice) -> Result<Self, Self::Error> {
        let ip: IpAddr = raw
            .ip
            .trim()
            .parse()
            .map_err(|_| CoreError::MalformedSnapshot {
                message: format!("device has invalid ip '{}'", raw.ip),
            })?;

        let id = non_empty(raw.id).unwrap_or_else(|| ip.to_string());

        Ok(Self {
            id,
            ip,
            status: DeviceStatus::from_wire(raw.status.as_deref()),
            packet_count: raw.packet_count,
            packet_limit: raw.packet_limit.unwrap_or(DEFAULT_PACKET_LIMIT),
            recent_packet_history: trim_window(raw.recent_packet_history.unwrap_or_default()),
            recent_bandwidth_rate: trim_window(raw.recent_bandwidth_rate.unwrap_or_default()),
            identity: DeviceIdentity {
                last_protocol: non_empty(raw.last_protocol),
                last_port: raw.last_port,
                is_local: raw.is_local.unwrap_or_else(|| is_local_address(ip)),
                mac_address: non_empty(raw.mac_address),
                manufacturer: non_empty(raw.manufacturer),
                device_type: non_empty(raw.device_type),
                os_fingerprint: non_empty(raw.os_fingerprint),
                last_visited_domain: non_empty(raw.last_visited_domain),
            },
        })
    }
}

// ── Snapshot ───────────────────────────────────────────────────────

impl TryFrom<NetworkStatusResponse> for Snapshot {
    type Error = CoreError;

    fn try_from(raw: NetworkStatusResponse) -> Result<Self, Self::Error> {
        let mut seen = HashSet::with_capacity(raw.devices.len());
        let devices = raw
            .devices
            .into_iter()
            .map(|d| {
                let device = Device::try_from(d)?;
                if !seen.insert(device.ip) {
                    return Err(CoreError::MalformedSnapshot {
                        message: format!("duplicate device ip {}", device.ip),
                    });
                }
                Ok(device)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let status = raw.status.unwrap_or_default();
        Ok(Self {
            devices,
            attack_mode: status.is_attack_mode.unwrap_or(false),
            attacker_ip: non_empty(status.attacker_ip),
            simulating: status.simulating.unwrap_or(false),
            service_running: status.is_running,
        })
    }
}

// ── Action acknowledgment ──────────────────────────────────────────

/// The authoritative fields an action acknowledgment may update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DevicePatch {
    pub status: Option<DeviceStatus>,
    pub packet_limit: Option<u64>,
}

impl DevicePatch {
    /// Overwrite only the fields this patch carries.
    pub(crate) fn apply_to(self, device: &mut Device) {
        if let Some(status) = self.status {
            device.status = status;
        }
        if let Some(limit) = self.packet_limit {
            device.packet_limit = limit;
        }
    }
}

impl From<DeviceAck> for DevicePatch {
    fn from(ack: DeviceAck) -> Self {
        Self {
            status: ack
                .status
                .as_deref()
                .map(|s| DeviceStatus::from_wire(Some(s)))
                .filter(|s| *s != DeviceStatus::Unknown),
            packet_limit: ack.packet_limit,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw_snapshot(value: serde_json::Value) -> NetworkStatusResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn absent_optionals_fall_back_to_defaults() {
        let snap = Snapshot::try_from(raw_snapshot(json!({
            "devices": [{ "ip": "10.0.0.5" }]
        })))
        .unwrap();

        let d = &snap.devices[0];
        assert_eq!(d.id, "10.0.0.5");
        assert_eq!(d.status, DeviceStatus::Unknown);
        assert_eq!(d.packet_limit, DEFAULT_PACKET_LIMIT);
        assert_eq!(d.packet_count, None);
        assert!(d.recent_packet_history.is_empty());
        assert_eq!(d.protocol_label(), "N/A");
        assert!(d.identity.is_local);
        assert!(!snap.simulating);
        assert!(!snap.attack_mode);
    }

    #[test]
    fn history_longer_than_window_keeps_newest_samples() {
        let snap = Snapshot::try_from(raw_snapshot(json!({
            "devices": [{ "ip": "10.0.0.5", "recentPacketHistory": [1, 2, 3, 4, 5, 6, 7] }]
        })))
        .unwrap();

        assert_eq!(snap.devices[0].recent_packet_history, vec![3, 4, 5, 6, 7]);
        assert_eq!(snap.devices[0].current_rate(), 25);
    }

    #[test]
    fn invalid_ip_is_malformed() {
        let result = Snapshot::try_from(raw_snapshot(json!({
            "devices": [{ "ip": "not-an-ip" }]
        })));
        assert!(matches!(result, Err(CoreError::MalformedSnapshot { .. })));
    }

    #[test]
    fn duplicate_ip_is_malformed() {
        let result = Snapshot::try_from(raw_snapshot(json!({
            "devices": [{ "ip": "10.0.0.5" }, { "ip": "10.0.0.5" }]
        })));
        assert!(matches!(result, Err(CoreError::MalformedSnapshot { .. })));
    }

    #[test]
    fn public_address_without_flag_is_not_local() {
        let snap = Snapshot::try_from(raw_snapshot(json!({
            "devices": [{ "ip": "8.8.8.8" }]
        })))
        .unwrap();
        assert!(!snap.devices[0].identity.is_local);
    }

    #[test]
    fn ack_patch_ignores_unknown_status() {
        let patch = DevicePatch::from(DeviceAck {
            status: Some("whatever".into()),
            packet_limit: Some(900),
        });
        assert_eq!(patch.status, None);
        assert_eq!(patch.packet_limit, Some(900));
    }
}
