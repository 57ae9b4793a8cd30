// netaudit-api: Async Rust client for the network audit service

pub mod client;
pub mod error;
pub mod models;
pub mod transport;

pub use client::AuditClient;
pub use error::Error;
pub use models::{
    ActionKind, DeviceAck, DeviceActionRequest, DeviceActionResponse, MessageResponse,
    NetworkStatusResponse, RawAuditStatus, RawDevice,
};
pub use transport::{TlsMode, TransportConfig};
