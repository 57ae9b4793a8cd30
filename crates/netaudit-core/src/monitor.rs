// ── Monitor facade ──
//
// The main entry point for consumers. Owns the state store and wires the
// poller and dispatcher onto one shared `AuditClient`.

use std::net::IpAddr;
use std::sync::Arc;

use netaudit_api::{AuditClient, TlsMode, TransportConfig};
use tokio::sync::watch;

use crate::config::{MonitorConfig, TlsVerification};
use crate::convert::DevicePatch;
use crate::detail::DetailView;
use crate::dispatch::{ActionDispatcher, DeviceAction};
use crate::error::CoreError;
use crate::indicator::SystemIndicator;
use crate::model::{LogEntry, Snapshot};
use crate::poller::SnapshotPoller;
use crate::store::{DashboardState, Outcome, StateStore, StateUpdate};

/// Cheaply cloneable handle on a monitored audit service.
///
/// Nothing is fetched until [`start`](Self::start) or
/// [`fetch_snapshot`](Self::fetch_snapshot) is called.
#[derive(Clone)]
pub struct Monitor {
    inner: Arc<MonitorInner>,
}

struct MonitorInner {
    config: MonitorConfig,
    store: Arc<StateStore>,
    poller: SnapshotPoller,
    dispatcher: ActionDispatcher,
}

impl Monitor {
    /// Build the HTTP client and an empty, stopped monitor.
    pub fn new(config: MonitorConfig) -> Result<Self, CoreError> {
        let transport = build_transport(&config);
        let client = AuditClient::new(config.url.clone(), &transport)?;
        let store = Arc::new(StateStore::new(config.log_capacity));

        let poller = SnapshotPoller::new(client.clone(), Arc::clone(&store), config.poll_interval);
        let dispatcher = ActionDispatcher::new(client, Arc::clone(&store), config.command_style);

        Ok(Self {
            inner: Arc::new(MonitorInner {
                config,
                store,
                poller,
                dispatcher,
            }),
        })
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.inner.config
    }

    // ── Poller lifecycle ─────────────────────────────────────────────

    /// Start (or restart) periodic polling.
    pub async fn start(&self) {
        self.inner.poller.start().await;
    }

    /// Stop periodic polling. Idempotent.
    pub async fn stop(&self) {
        self.inner.poller.stop().await;
    }

    pub fn is_running(&self) -> bool {
        self.inner.store.with(DashboardState::is_running)
    }

    /// One fetch outside the poll loop. Leaves the dashboard state alone.
    pub async fn fetch_snapshot(&self) -> Result<Snapshot, CoreError> {
        self.inner.poller.fetch().await
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Send a device command; see [`ActionDispatcher::dispatch`].
    pub async fn dispatch(&self, ip: IpAddr, action: DeviceAction) -> Result<DevicePatch, CoreError> {
        self.inner.dispatcher.dispatch(ip, action).await
    }

    /// Reset the service's state and forget the held snapshot.
    pub async fn reset(&self) -> Result<(), CoreError> {
        self.inner.dispatcher.reset().await
    }

    // ── Detail view ──────────────────────────────────────────────────

    /// Open the live detail view on `ip`, replacing any open view.
    pub fn open_detail(&self, ip: IpAddr) -> Result<DetailView, CoreError> {
        match self.inner.store.apply(StateUpdate::OpenDetail { ip }) {
            Outcome::Applied => self
                .inner
                .store
                .with(|s| s.detail().cloned())
                .ok_or_else(|| not_found(ip)),
            Outcome::Discarded => Err(not_found(ip)),
        }
    }

    pub fn close_detail(&self) {
        self.inner.store.apply(StateUpdate::CloseDetail);
    }

    // ── State access ─────────────────────────────────────────────────

    /// Clone of the current dashboard state.
    pub fn state(&self) -> DashboardState {
        self.inner.store.current()
    }

    /// Receiver notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<DashboardState> {
        self.inner.store.subscribe()
    }

    pub fn indicator(&self) -> SystemIndicator {
        self.inner.store.with(DashboardState::indicator)
    }

    /// Audit log entries, oldest first.
    pub fn log_entries(&self) -> Vec<LogEntry> {
        self.inner.store.with(|s| s.log().to_vec())
    }
}

fn not_found(ip: IpAddr) -> CoreError {
    CoreError::DeviceNotFound {
        identifier: ip.to_string(),
    }
}

fn build_transport(config: &MonitorConfig) -> TransportConfig {
    let tls = match &config.tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    };
    TransportConfig {
        tls,
        timeout: config.timeout,
    }
}
