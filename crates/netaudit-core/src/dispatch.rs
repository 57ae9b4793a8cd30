// ── Device action dispatch ──
//
// Sends user-initiated block / unblock / limit commands and, once the
// service acknowledges, applies an optimistic patch to the held snapshot
// through the state store. A failed command touches nothing.

use std::net::IpAddr;
use std::sync::Arc;

use chrono::Utc;
use netaudit_api::{ActionKind, AuditClient, DeviceActionRequest};
use tracing::{debug, info, warn};

use crate::config::CommandStyle;
use crate::convert::DevicePatch;
use crate::error::CoreError;
use crate::model::{DeviceStatus, LogEntry};
use crate::store::{StateStore, StateUpdate};

/// A user-initiated mutation of one device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceAction {
    Block,
    Unblock,
    /// Set the packet-rate limit. Must be greater than zero.
    Limit(u64),
}

impl DeviceAction {
    fn kind(self) -> ActionKind {
        match self {
            Self::Block => ActionKind::Block,
            Self::Unblock => ActionKind::Unblock,
            Self::Limit(_) => ActionKind::Limit,
        }
    }

    pub fn name(self) -> &'static str {
        self.kind().as_str()
    }
}

/// Sends device commands and records their effects.
#[derive(Clone)]
pub struct ActionDispatcher {
    client: AuditClient,
    store: Arc<StateStore>,
    style: CommandStyle,
}

impl ActionDispatcher {
    pub fn new(client: AuditClient, store: Arc<StateStore>, style: CommandStyle) -> Self {
        Self {
            client,
            store,
            style,
        }
    }

    /// Send `action` for `ip`. On acknowledgment, patch the held device
    /// with the fields the service returned and append a log entry.
    ///
    /// Concurrent dispatches for the same device are not coalesced.
    pub async fn dispatch(&self, ip: IpAddr, action: DeviceAction) -> Result<DevicePatch, CoreError> {
        if action == DeviceAction::Limit(0) {
            return Err(CoreError::ValidationFailed {
                message: "packet limit must be greater than zero".into(),
            });
        }

        debug!(%ip, action = action.name(), style = %self.style, "dispatching device action");
        let patch = match self.style {
            CommandStyle::Unified => self.send_unified(ip, action).await,
            CommandStyle::PerDevice => self.send_per_device(ip, action).await,
        }
        .inspect_err(|e| warn!(%ip, action = action.name(), error = %e, "device action failed"))?;

        let entry = self.entry_for(ip, action);
        info!(%ip, action = action.name(), "device action acknowledged");
        self.store.apply(StateUpdate::Patch { ip, patch, entry });
        Ok(patch)
    }

    /// Ask the service to clear all of its state, then forget ours.
    pub async fn reset(&self) -> Result<(), CoreError> {
        self.client.reset().await.map_err(|e| {
            warn!(error = %e, "reset failed");
            CoreError::from(e)
        })?;
        self.store.apply(StateUpdate::Reset {
            entry: LogEntry::normal("Audit service state reset", Utc::now()),
        });
        Ok(())
    }

    async fn send_unified(&self, ip: IpAddr, action: DeviceAction) -> Result<DevicePatch, CoreError> {
        let request = DeviceActionRequest {
            ip: ip.to_string(),
            action: action.kind(),
            limit: match action {
                DeviceAction::Limit(n) => Some(n),
                _ => None,
            },
        };
        let ack = self
            .client
            .device_action(&request)
            .await
            .map_err(|e| CoreError::action(action.name(), ip, &e))?;

        Ok(ack.device.map(DevicePatch::from).unwrap_or_default())
    }

    async fn send_per_device(&self, ip: IpAddr, action: DeviceAction) -> Result<DevicePatch, CoreError> {
        let status = match action {
            DeviceAction::Block => DeviceStatus::Blocked,
            DeviceAction::Unblock => DeviceStatus::Connected,
            DeviceAction::Limit(_) => {
                return Err(CoreError::Unsupported {
                    operation: "limit".into(),
                    required: "the unified command style".into(),
                });
            }
        };
        self.client
            .device_command(&ip.to_string(), action.kind())
            .await
            .map_err(|e| CoreError::action(action.name(), ip, &e))?;

        // This surface acknowledges with a message only; the status change is implied.
        Ok(DevicePatch {
            status: Some(status),
            packet_limit: None,
        })
    }

    fn entry_for(&self, ip: IpAddr, action: DeviceAction) -> LogEntry {
        let id = self
            .store
            .with(|s| s.snapshot().and_then(|snap| snap.device(ip)).map(|d| d.id.clone()))
            .unwrap_or_else(|| ip.to_string());
        let now = Utc::now();

        match action {
            DeviceAction::Block => LogEntry::critical(format!("Manual block: {id} ({ip})"), now),
            DeviceAction::Unblock => LogEntry::normal(format!("Manual unblock: {id} ({ip})"), now),
            DeviceAction::Limit(n) => {
                LogEntry::normal(format!("Packet limit for {id} ({ip}) set to {n}"), now)
            }
        }
    }
}
