// ── Domain model ──

pub mod interface;

pub use interface::{
    DEFAULT_KIND, DeviceId, Interface, InterfaceId, InterfaceRecord, InterfaceRow, LinkStatus,
};
