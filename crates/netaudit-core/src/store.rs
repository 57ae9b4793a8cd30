// ── Dashboard state store ──
//
// Single owned container for everything the monitor knows: the current
// snapshot, the audit log, the poller state and the open detail view.
// All mutation goes through `StateStore::apply`, which runs inside one
// `watch::Sender::send_if_modified` critical section, so a poll
// replacement and an action patch can never interleave.

use std::net::IpAddr;

use chrono::Utc;
use serde::Serialize;
use tokio::sync::watch;
use tracing::debug;

use crate::audit_log::AuditLog;
use crate::convert::DevicePatch;
use crate::detail::DetailView;
use crate::indicator::{SystemIndicator, aggregate};
use crate::model::{LogEntry, Snapshot};
use crate::reconcile::reconcile;

/// Lifecycle of the snapshot poller as seen by consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum PollerState {
    Stopped,
    Running,
    /// Stopped itself after a failed poll; needs an explicit restart.
    Disconnected { reason: String },
}

impl PollerState {
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }
}

/// Point-in-time view of the monitor.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardState {
    snapshot: Option<Snapshot>,
    log: AuditLog,
    poller: PollerState,
    detail: Option<DetailView>,
    #[serde(skip)]
    generation: u64,
}

impl DashboardState {
    fn new(log_capacity: usize) -> Self {
        Self {
            snapshot: None,
            log: AuditLog::with_capacity(log_capacity),
            poller: PollerState::Stopped,
            detail: None,
            generation: 0,
        }
    }

    /// The latest authoritative snapshot, if any poll has succeeded.
    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    pub fn log(&self) -> &AuditLog {
        &self.log
    }

    pub fn poller(&self) -> &PollerState {
        &self.poller
    }

    pub fn is_running(&self) -> bool {
        self.poller.is_running()
    }

    pub fn detail(&self) -> Option<&DetailView> {
        self.detail.as_ref()
    }

    /// Recomputed on every call; never stored.
    pub fn indicator(&self) -> SystemIndicator {
        aggregate(self.is_running(), self.snapshot.as_ref())
    }

    fn accepts(&self, generation: u64) -> bool {
        self.poller.is_running() && self.generation == generation
    }
}

/// Every way the dashboard state may change.
#[derive(Debug, Clone)]
pub(crate) enum StateUpdate {
    /// A new poll loop took over; older generations are now stale.
    PollerStarted { generation: u64 },
    /// Explicit stop. No-op unless running.
    PollerStopped,
    /// Wholesale snapshot replacement from poll `generation`.
    Replace { generation: u64, snapshot: Snapshot },
    /// Poll `generation` failed; the poller disconnects itself.
    PollFailed { generation: u64, entry: LogEntry, reason: String },
    /// Optimistic patch after an acknowledged device action.
    Patch { ip: IpAddr, patch: DevicePatch, entry: LogEntry },
    /// The service's state was reset; forget the held snapshot.
    Reset { entry: LogEntry },
    OpenDetail { ip: IpAddr },
    CloseDetail,
}

/// Whether an update changed anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Outcome {
    Applied,
    Discarded,
}

/// Owner of the [`DashboardState`]; vends `watch` subscriptions.
pub struct StateStore {
    state: watch::Sender<DashboardState>,
}

impl StateStore {
    pub fn new(log_capacity: usize) -> Self {
        let (state, _) = watch::channel(DashboardState::new(log_capacity));
        Self { state }
    }

    /// Clone of the current state.
    pub fn current(&self) -> DashboardState {
        self.state.borrow().clone()
    }

    /// Read the current state without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&DashboardState) -> R) -> R {
        f(&self.state.borrow())
    }

    /// Subscribe to state changes.
    pub fn subscribe(&self) -> watch::Receiver<DashboardState> {
        self.state.subscribe()
    }

    /// The one mutation entry point.
    pub(crate) fn apply(&self, update: StateUpdate) -> Outcome {
        let mut outcome = Outcome::Discarded;
        self.state.send_if_modified(|state| {
            outcome = apply_update(state, update);
            outcome == Outcome::Applied
        });
        outcome
    }
}

fn apply_update(state: &mut DashboardState, update: StateUpdate) -> Outcome {
    let now = Utc::now();

    match update {
        StateUpdate::PollerStarted { generation } => {
            state.generation = generation;
            state.poller = PollerState::Running;
        }
        StateUpdate::PollerStopped => {
            if !state.poller.is_running() {
                return Outcome::Discarded;
            }
            state.poller = PollerState::Stopped;
        }
        StateUpdate::Replace {
            generation,
            snapshot,
        } => {
            if !state.accepts(generation) {
                debug!(generation, "discarding snapshot from a stale poll");
                return Outcome::Discarded;
            }
            for entry in reconcile(state.snapshot.as_ref(), &snapshot, now) {
                state.log.append(entry);
            }
            if let Some(detail) = state.detail.as_mut() {
                detail.sync(&snapshot, now);
            }
            state.snapshot = Some(snapshot);
        }
        StateUpdate::PollFailed {
            generation,
            entry,
            reason,
        } => {
            if !state.accepts(generation) {
                debug!(generation, "discarding failure from a stale poll");
                return Outcome::Discarded;
            }
            state.log.append(entry);
            state.poller = PollerState::Disconnected { reason };
        }
        StateUpdate::Patch { ip, patch, entry } => {
            if let Some(device) = state.snapshot.as_mut().and_then(|s| s.device_mut(ip)) {
                patch.apply_to(device);
            }
            if let (Some(detail), Some(snapshot)) = (state.detail.as_mut(), state.snapshot.as_ref()) {
                detail.sync(snapshot, now);
            }
            state.log.append(entry);
        }
        StateUpdate::Reset { entry } => {
            state.snapshot = None;
            if let Some(detail) = state.detail.as_mut() {
                detail.mark_stale(now);
            }
            state.log.append(entry);
        }
        StateUpdate::OpenDetail { ip } => {
            let Some(view) = state.snapshot.as_ref().and_then(|s| DetailView::open(ip, s)) else {
                return Outcome::Discarded;
            };
            state.detail = Some(view);
        }
        StateUpdate::CloseDetail => {
            if state.detail.take().is_none() {
                return Outcome::Discarded;
            }
        }
    }

    Outcome::Applied
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DEFAULT_PACKET_LIMIT, Device, DeviceIdentity, DeviceStatus, Severity};
    use pretty_assertions::assert_eq;

    fn device(last_octet: u8, status: DeviceStatus) -> Device {
        Device {
            id: format!("HOST-{last_octet}"),
            ip: IpAddr::from([10, 0, 0, last_octet]),
            status,
            packet_count: Some(10),
            packet_limit: DEFAULT_PACKET_LIMIT,
            recent_packet_history: vec![1, 2, 3],
            recent_bandwidth_rate: Vec::new(),
            identity: DeviceIdentity::default(),
        }
    }

    fn snapshot(devices: Vec<Device>) -> Snapshot {
        Snapshot {
            devices,
            ..Snapshot::default()
        }
    }

    fn running_store() -> StateStore {
        let store = StateStore::new(100);
        store.apply(StateUpdate::PollerStarted { generation: 1 });
        store
    }

    #[test]
    fn snapshot_from_stale_generation_is_discarded() {
        let store = running_store();
        store.apply(StateUpdate::PollerStarted { generation: 2 });

        let outcome = store.apply(StateUpdate::Replace {
            generation: 1,
            snapshot: snapshot(vec![device(5, DeviceStatus::Blocked)]),
        });

        assert_eq!(outcome, Outcome::Discarded);
        assert!(store.current().snapshot().is_none());
        assert!(store.current().log().is_empty());
    }

    #[test]
    fn snapshot_after_stop_is_discarded() {
        let store = running_store();
        store.apply(StateUpdate::PollerStopped);

        let outcome = store.apply(StateUpdate::Replace {
            generation: 1,
            snapshot: snapshot(vec![device(5, DeviceStatus::Connected)]),
        });
        assert_eq!(outcome, Outcome::Discarded);
    }

    #[test]
    fn stop_when_stopped_is_a_noop() {
        let store = StateStore::new(100);
        assert_eq!(store.apply(StateUpdate::PollerStopped), Outcome::Discarded);
        assert_eq!(*store.current().poller(), PollerState::Stopped);
    }

    #[test]
    fn poll_failure_disconnects_and_logs_critical() {
        let store = running_store();
        store.apply(StateUpdate::PollFailed {
            generation: 1,
            entry: LogEntry::critical("lost", Utc::now()),
            reason: "connection refused".into(),
        });

        let state = store.current();
        assert_eq!(
            *state.poller(),
            PollerState::Disconnected {
                reason: "connection refused".into()
            }
        );
        assert_eq!(state.log().len(), 1);
        assert_eq!(state.indicator().label, "Inactive");
    }

    #[test]
    fn patch_updates_only_authoritative_fields_and_refreshes_detail() {
        let store = running_store();
        store.apply(StateUpdate::Replace {
            generation: 1,
            snapshot: snapshot(vec![device(5, DeviceStatus::Connected)]),
        });
        let ip = IpAddr::from([10, 0, 0, 5]);
        assert_eq!(store.apply(StateUpdate::OpenDetail { ip }), Outcome::Applied);

        store.apply(StateUpdate::Patch {
            ip,
            patch: DevicePatch {
                status: Some(DeviceStatus::Blocked),
                packet_limit: Some(900),
            },
            entry: LogEntry::critical("manual block", Utc::now()),
        });

        let state = store.current();
        let d = state.snapshot().and_then(|s| s.device(ip)).cloned();
        let d = d.expect("device present");
        assert_eq!(d.status, DeviceStatus::Blocked);
        assert_eq!(d.packet_limit, 900);
        assert_eq!(d.recent_packet_history, vec![1, 2, 3]);
        assert_eq!(state.detail().map(|v| v.device().status), Some(DeviceStatus::Blocked));
        assert_eq!(state.log().latest().map(|e| e.severity), Some(Severity::Critical));
        assert_eq!(state.indicator().label, "Threat contained (1 blocked)");
    }

    #[test]
    fn detail_goes_stale_when_device_disappears() {
        let store = running_store();
        store.apply(StateUpdate::Replace {
            generation: 1,
            snapshot: snapshot(vec![device(5, DeviceStatus::Connected)]),
        });
        let ip = IpAddr::from([10, 0, 0, 5]);
        store.apply(StateUpdate::OpenDetail { ip });
        store.apply(StateUpdate::Replace {
            generation: 1,
            snapshot: snapshot(vec![]),
        });

        let state = store.current();
        let view = state.detail().expect("detail open");
        assert!(view.is_stale());
        assert_eq!(view.device().id, "HOST-5");
    }

    #[test]
    fn open_detail_for_unknown_ip_is_discarded() {
        let store = running_store();
        let outcome = store.apply(StateUpdate::OpenDetail {
            ip: IpAddr::from([10, 0, 0, 9]),
        });
        assert_eq!(outcome, Outcome::Discarded);
        assert!(store.current().detail().is_none());
    }

    #[test]
    fn reset_forgets_snapshot_so_next_poll_is_a_first_poll() {
        let store = running_store();
        store.apply(StateUpdate::Replace {
            generation: 1,
            snapshot: snapshot(vec![device(5, DeviceStatus::Connected)]),
        });
        store.apply(StateUpdate::Reset {
            entry: LogEntry::normal("reset", Utc::now()),
        });
        assert!(store.current().snapshot().is_none());

        store.apply(StateUpdate::Replace {
            generation: 1,
            snapshot: snapshot(vec![device(6, DeviceStatus::Connected)]),
        });
        // Only the reset entry: no "new device" / "no longer reported" noise.
        assert_eq!(store.current().log().len(), 1);
    }
}
