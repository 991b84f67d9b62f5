// ── Interface status resolution ──
//
// Devices report a liveness flag per interface, but wireless and CAPsMAN
// managed interfaces routinely report `false` while passing traffic. These
// rules turn the raw record into the status and speed shown to operators.

use crate::model::{InterfaceRecord, LinkStatus};

/// Speed shown for an up interface whose device omitted one.
pub const DEFAULT_UP_SPEED: &str = "1Gbps";

/// Derived status and effective speed for one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub status: LinkStatus,
    pub speed: Option<String>,
}

/// Whether an interface belongs to the family whose reported liveness
/// cannot be trusted.
///
/// Matches a kind containing `cap`, or a name containing `cap` or `wlan`,
/// all case-insensitive.
pub fn is_capability_like(kind: &str, name: &str) -> bool {
    let kind = kind.to_ascii_lowercase();
    let name = name.to_ascii_lowercase();
    kind.contains("cap") || name.contains("cap") || name.contains("wlan")
}

/// Resolve the operator-facing status of a record.
///
/// Capability-style interfaces are up whenever they are administratively
/// enabled; everything else uses the reported flag as is.
pub fn resolve(record: &InterfaceRecord) -> Resolution {
    let override_up = is_capability_like(&record.kind, &record.name) && !record.disabled;
    let status = LinkStatus::from(record.reported_up || override_up);

    let speed = match (&record.speed, status) {
        (Some(speed), _) => Some(speed.clone()),
        (None, LinkStatus::Up) => Some(DEFAULT_UP_SPEED.to_owned()),
        (None, LinkStatus::Down) => None,
    };

    Resolution { status, speed }
}
