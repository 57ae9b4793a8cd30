// ── Domain model ──
//
// Canonical types consumed by the reconciler, the state store and the
// CLI. Built from `netaudit-api` wire types in `crate::convert`.

pub mod device;
pub mod log;
pub mod snapshot;

pub use device::{DEFAULT_PACKET_LIMIT, Device, DeviceIdentity, DeviceStatus, HISTORY_WINDOW};
pub use log::{LogEntry, Severity};
pub use snapshot::Snapshot;
