// ── Interface domain types ──
//
// Canonical interface records, the derived link status, and the row view
// model handed to consumers.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::format::fmt_bytes;

/// Kind assumed when the device does not classify an interface.
pub const DEFAULT_KIND: &str = "Physical";

// ── Identifiers ──────────────────────────────────────────────────────

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

string_id!(
    /// Identifier of an interface, stable across polls of the same device.
    InterfaceId
);

string_id!(
    /// Identifier of a managed device.
    DeviceId
);

// ── Link status ──────────────────────────────────────────────────────

/// Derived up/down state of an interface.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum LinkStatus {
    Up,
    Down,
}

impl LinkStatus {
    pub fn is_up(self) -> bool {
        self == Self::Up
    }
}

impl From<bool> for LinkStatus {
    fn from(up: bool) -> Self {
        if up { Self::Up } else { Self::Down }
    }
}

// ── Records ──────────────────────────────────────────────────────────

/// Device-reported interface data with canonical defaults applied
/// (missing kind is `"Physical"`, missing counters are zero).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceRecord {
    pub id: InterfaceId,
    pub name: String,
    pub kind: String,
    pub mac_address: Option<String>,
    /// Raw liveness signal; unreliable for capability-style interfaces.
    pub reported_up: bool,
    /// Administrative state, operator controlled.
    pub disabled: bool,
    pub speed: Option<String>,
    pub rx_bytes: u64,
    pub tx_bytes: u64,
    pub comment: Option<String>,
}

/// An interface as held by the store: the record plus its resolved status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interface {
    #[serde(flatten)]
    pub record: InterfaceRecord,
    pub status: LinkStatus,
    /// Effective speed: reported, or synthesized for up interfaces.
    pub effective_speed: Option<String>,
}

impl Interface {
    pub fn id(&self) -> &InterfaceId {
        &self.record.id
    }

    pub fn name(&self) -> &str {
        &self.record.name
    }

    pub fn is_enabled(&self) -> bool {
        !self.record.disabled
    }
}

// ── Row view model ───────────────────────────────────────────────────

/// Flat, serializable row for table or JSON rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterfaceRow {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub status: LinkStatus,
    pub mac_address: Option<String>,
    pub speed: Option<String>,
    pub rx_bytes: u64,
    pub tx_bytes: u64,
    pub comment: Option<String>,
    pub disabled: bool,
    /// Pre-formatted `rx_bytes`.
    pub rx: String,
    /// Pre-formatted `tx_bytes`.
    pub tx: String,
}

impl From<&Interface> for InterfaceRow {
    fn from(iface: &Interface) -> Self {
        let r = &iface.record;
        Self {
            id: r.id.to_string(),
            name: r.name.clone(),
            kind: r.kind.clone(),
            status: iface.status,
            mac_address: r.mac_address.clone(),
            speed: iface.effective_speed.clone(),
            rx_bytes: r.rx_bytes,
            tx_bytes: r.tx_bytes,
            comment: r.comment.clone(),
            disabled: r.disabled,
            rx: fmt_bytes(r.rx_bytes),
            tx: fmt_bytes(r.tx_bytes),
        }
    }
}

impl From<&Arc<Interface>> for InterfaceRow {
    fn from(iface: &Arc<Interface>) -> Self {
        Self::from(iface.as_ref())
    }
}
