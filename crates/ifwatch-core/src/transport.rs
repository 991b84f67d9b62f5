// ── Transport seam ──
//
// The core talks to devices only through `InterfaceTransport`, implemented
// for the HTTP `ApiClient` here and by scripted fakes in tests.

use std::future::Future;
use std::time::Duration;

use ifwatch_api::{ApiClient, Error as ApiError, RawInterface, ToggleResponse};

use crate::model::{DeviceId, InterfaceId};

/// Operations the monitor needs from the interface API.
pub trait InterfaceTransport: Send + Sync + 'static {
    /// Fetch every interface of `device_id`, in device order.
    fn list_interfaces(
        &self,
        device_id: &DeviceId,
    ) -> impl Future<Output = Result<Vec<RawInterface>, ApiError>> + Send;

    /// Ask the device to enable or disable one interface.
    fn toggle_interface(
        &self,
        interface_id: &InterfaceId,
        device_id: &DeviceId,
        enable: bool,
    ) -> impl Future<Output = Result<ToggleResponse, ApiError>> + Send;
}

impl InterfaceTransport for ApiClient {
    fn list_interfaces(
        &self,
        device_id: &DeviceId,
    ) -> impl Future<Output = Result<Vec<RawInterface>, ApiError>> + Send {
        ApiClient::list_interfaces(self, device_id.as_str())
    }

    fn toggle_interface(
        &self,
        interface_id: &InterfaceId,
        device_id: &DeviceId,
        enable: bool,
    ) -> impl Future<Output = Result<ToggleResponse, ApiError>> + Send {
        ApiClient::toggle_interface(self, interface_id.as_str(), device_id.as_str(), enable)
    }
}

/// Run a transport call under a hard deadline.
///
/// The HTTP client carries its own timeout, but fakes and custom transports
/// do not; this keeps every call bounded regardless of implementation.
pub(crate) async fn bounded<T, F>(limit: Duration, call: F) -> Result<T, ApiError>
where
    F: Future<Output = Result<T, ApiError>>,
{
    tokio::time::timeout(limit, call)
        .await
        .unwrap_or_else(|_| {
            Err(ApiError::Timeout {
                timeout_secs: limit.as_secs(),
            })
        })
}
