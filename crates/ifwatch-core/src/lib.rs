// ifwatch-core: Interface state reconciliation and control between
// ifwatch-api and its consumers.

pub mod config;
pub mod convert;
pub mod error;
pub mod format;
pub mod model;
pub mod monitor;
pub mod notice;
pub mod poller;
pub mod status;
pub mod store;
pub mod stream;
pub mod toggle;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{MonitorConfig, TlsVerification};
pub use error::CoreError;
pub use format::fmt_bytes;
pub use monitor::Monitor;
pub use notice::{Notice, NoticeLevel};
pub use poller::Poller;
pub use status::{Resolution, is_capability_like, resolve};
pub use store::{InterfaceStore, LoadOutcome, StoreState};
pub use stream::{InterfaceStream, InterfaceWatchStream};
pub use toggle::{ToggleController, ToggleOutcome};
pub use transport::InterfaceTransport;

pub use model::{
    DEFAULT_KIND, DeviceId, Interface, InterfaceId, InterfaceRecord, InterfaceRow, LinkStatus,
};
