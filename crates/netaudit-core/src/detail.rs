// ── Live device detail view ──
//
// An open detail view holds its device *by value* and is re-bound to the
// latest record for its ip on every snapshot. When the device is missing
// from a snapshot the last known values are kept but flagged stale.

use std::net::IpAddr;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::{Device, Snapshot};

/// The data bound to an open device detail view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailView {
    ip: IpAddr,
    device: Device,
    /// Set when the device was absent from the most recent snapshot.
    stale_since: Option<DateTime<Utc>>,
}

impl DetailView {
    /// Open a view on `ip`, or `None` if the snapshot does not know it.
    pub fn open(ip: IpAddr, snapshot: &Snapshot) -> Option<Self> {
        snapshot.device(ip).map(|device| Self {
            ip,
            device: device.clone(),
            stale_since: None,
        })
    }

    pub fn ip(&self) -> IpAddr {
        self.ip
    }

    /// Latest known values for the device.
    pub fn device(&self) -> &Device {
        &self.device
    }

    pub fn is_stale(&self) -> bool {
        self.stale_since.is_some()
    }

    /// When the device first went missing, if it is currently missing.
    pub fn stale_since(&self) -> Option<DateTime<Utc>> {
        self.stale_since
    }

    /// Re-bind to `snapshot`'s record for this ip.
    pub fn sync(&mut self, snapshot: &Snapshot, at: DateTime<Utc>) {
        match snapshot.device(self.ip) {
            Some(device) => {
                self.device = device.clone();
                self.stale_since = None;
            }
            None => self.mark_stale(at),
        }
    }

    /// Flag the held values as outdated without replacing them.
    pub fn mark_stale(&mut self, at: DateTime<Utc>) {
        self.stale_since.get_or_insert(at);
    }
}
