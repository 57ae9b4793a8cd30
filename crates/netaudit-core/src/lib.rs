// netaudit-core: Reconciliation engine and live state between netaudit-api and the CLI.

pub mod audit_log;
pub mod config;
pub mod convert;
pub mod detail;
pub mod dispatch;
pub mod error;
pub mod indicator;
pub mod model;
pub mod monitor;
pub mod poller;
pub mod reconcile;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use audit_log::{AuditLog, LOG_CAPACITY};
pub use config::{CommandStyle, DEFAULT_POLL_INTERVAL, MonitorConfig, TlsVerification};
pub use convert::DevicePatch;
pub use detail::DetailView;
pub use dispatch::{ActionDispatcher, DeviceAction};
pub use error::CoreError;
pub use indicator::{IndicatorLevel, SystemIndicator, aggregate};
pub use monitor::Monitor;
pub use poller::SnapshotPoller;
pub use reconcile::reconcile;
pub use store::{DashboardState, PollerState, StateStore};

pub use model::{
    DEFAULT_PACKET_LIMIT, Device, DeviceIdentity, DeviceStatus, HISTORY_WINDOW, LogEntry, Severity,
    Snapshot,
};
