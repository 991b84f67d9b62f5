// ── Core error types ──
//
// Operator-facing errors from ifwatch-core. Consumers never see HTTP status
// codes or JSON parse failures directly; the conversions below translate
// transport-layer errors into the variants an operator can act on.

use thiserror::Error;

use crate::model::{DeviceId, InterfaceId};
use crate::notice::Notice;

/// Generic text shown when the device rejected a toggle without saying why.
pub const TOGGLE_FALLBACK_MESSAGE: &str = "Failed to toggle interface";

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Read path ────────────────────────────────────────────────────
    /// Loading the interface list failed. The previous list is retained.
    #[error("Failed to load interfaces for device {device_id}: {reason}")]
    Fetch { device_id: DeviceId, reason: String },

    // ── Control path ─────────────────────────────────────────────────
    /// The device rejected an enable/disable command.
    #[error("{message}")]
    Toggle { message: String },

    /// The command never reached the device, or no answer came back in time.
    #[error("Could not reach the interface API: {reason}")]
    Transport { reason: String, timed_out: bool },

    #[error("A toggle for interface {interface_id} is already in progress")]
    Busy { interface_id: InterfaceId },

    #[error("No device selected")]
    NoDeviceSelected,

    /// The selection moved away from `device_id` while a command for it
    /// was outstanding. The command's result is dropped.
    #[error("Selection changed while the command for device {device_id} was in flight")]
    SelectionChanged { device_id: DeviceId },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Build a fetch error for `device_id` from a transport-layer failure.
    pub(crate) fn fetch(device_id: &DeviceId, err: &ifwatch_api::Error) -> Self {
        Self::Fetch {
            device_id: device_id.clone(),
            reason: err.to_string(),
        }
    }

    /// Map a failed toggle call.
    ///
    /// Anything that produced an HTTP response is a device rejection and
    /// carries the device's own message when it sent one. An unreadable
    /// reply body counts as a rejection without a message.
    pub(crate) fn toggle(err: ifwatch_api::Error) -> Self {
        match err {
            ifwatch_api::Error::Api { message, .. } => Self::Toggle {
                message: message.unwrap_or_else(|| TOGGLE_FALLBACK_MESSAGE.to_owned()),
            },
            ifwatch_api::Error::Deserialization { .. } => Self::Toggle {
                message: TOGGLE_FALLBACK_MESSAGE.to_owned(),
            },
            ifwatch_api::Error::InvalidUrl(e) => Self::Config {
                message: format!("Invalid URL: {e}"),
            },
            other => Self::Transport {
                timed_out: other.is_timeout(),
                reason: other.to_string(),
            },
        }
    }

    /// Map a 2xx toggle reply whose payload reports a refusal.
    pub(crate) fn toggle_refused(response: ifwatch_api::ToggleResponse) -> Self {
        let message = response
            .error
            .filter(|m| !m.trim().is_empty())
            .or(response.message.filter(|m| !m.trim().is_empty()))
            .unwrap_or_else(|| TOGGLE_FALLBACK_MESSAGE.to_owned());
        Self::Toggle { message }
    }

    /// Whether the failure is a connectivity problem rather than a
    /// rejection.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    /// Convert into the notice shown to the operator.
    pub fn notice(&self) -> Notice {
        match self {
            Self::Busy { .. } => Notice::info(self.to_string()),
            Self::Fetch { .. } | Self::SelectionChanged { .. } => Notice::warning(self.to_string()),
            _ => Notice::error(self.to_string()),
        }
    }
}

impl From<ifwatch_api::Error> for CoreError {
    fn from(err: ifwatch_api::Error) -> Self {
        match err {
            ifwatch_api::Error::InvalidUrl(e) => Self::Config {
                message: format!("Invalid URL: {e}"),
            },
            ifwatch_api::Error::Tls(msg) => Self::Config {
                message: format!("TLS setup failed: {msg}"),
            },
            ifwatch_api::Error::Deserialization { message, body: _ } => {
                Self::Internal(format!("Deserialization error: {message}"))
            }
            other if other.is_unreachable() => Self::Transport {
                timed_out: other.is_timeout(),
                reason: other.to_string(),
            },
            other => Self::Internal(other.to_string()),
        }
    }
}
