// ── API-to-domain type conversions ──
//
// Bridges raw `ifwatch_api` wire types into canonical `ifwatch_core::model`
// types, applying defaults for everything the device may omit, and runs
// status resolution on the result.

use ifwatch_api::RawInterface;
use tracing::warn;

use crate::model::{DEFAULT_KIND, Interface, InterfaceRecord};
use crate::status::resolve;

impl From<RawInterface> for InterfaceRecord {
    /// A record without a usable name is named after its id.
    fn from(raw: RawInterface) -> Self {
        let name = if raw.name.trim().is_empty() {
            warn!(interface_id = %raw.id, "device reported an interface without a name");
            raw.id.clone()
        } else {
            raw.name
        };
        Self {
            id: raw.id.into(),
            name,
            kind: raw
                .kind
                .filter(|k| !k.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_KIND.to_owned()),
            mac_address: raw.mac_address.filter(|m| !m.is_empty()),
            reported_up: raw.is_up.unwrap_or(false),
            disabled: raw.disabled.unwrap_or(false),
            speed: raw.speed.filter(|s| !s.is_empty()),
            rx_bytes: raw.rx_bytes.unwrap_or(0),
            tx_bytes: raw.tx_bytes.unwrap_or(0),
            comment: raw.comment.filter(|c| !c.is_empty()),
        }
    }
}

impl From<InterfaceRecord> for Interface {
    fn from(record: InterfaceRecord) -> Self {
        let resolution = resolve(&record);
        Self {
            record,
            status: resolution.status,
            effective_speed: resolution.speed,
        }
    }
}

impl From<RawInterface> for Interface {
    fn from(raw: RawInterface) -> Self {
        Self::from(InterfaceRecord::from(raw))
    }
}
