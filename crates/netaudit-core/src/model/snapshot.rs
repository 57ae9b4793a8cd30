// ── Snapshot ──

use std::net::IpAddr;

use serde::{Deserialize, Serialize};

use super::device::Device;

/// One polled response: every known device plus global service flags.
///
/// Replaced wholesale on each successful poll. `ip` is unique across
/// `devices` (enforced on conversion from the wire type).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub devices: Vec<Device>,
    pub attack_mode: bool,
    pub attacker_ip: Option<String>,
    /// The service is running its fallback/simulation path, not real capture.
    pub simulating: bool,
    /// The service's own view of its capture loop, when reported.
    pub service_running: Option<bool>,
}

impl Snapshot {
    pub fn device(&self, ip: IpAddr) -> Option<&Device> {
        self.devices.iter().find(|d| d.ip == ip)
    }

    pub(crate) fn device_mut(&mut self, ip: IpAddr) -> Option<&mut Device> {
        self.devices.iter_mut().find(|d| d.ip == ip)
    }

    pub fn contains(&self, ip: IpAddr) -> bool {
        self.device(ip).is_some()
    }

    /// Number of devices currently in the `Blocked` state.
    pub fn blocked_count(&self) -> usize {
        self.devices.iter().filter(|d| d.is_blocked()).count()
    }
}
