// Interface endpoints
//
// Listing via GET /api/devices/{deviceId}/interfaces and administrative
// enable/disable via POST /api/interfaces/{interfaceId}/toggle.

use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{RawInterface, ToggleRequest, ToggleResponse};

impl ApiClient {
    /// List all interfaces of a device.
    ///
    /// `GET /api/devices/{device_id}/interfaces`
    pub async fn list_interfaces(&self, device_id: &str) -> Result<Vec<RawInterface>, Error> {
        let url = self.endpoint(&["api", "devices", device_id, "interfaces"]);
        debug!(device_id, "listing interfaces");
        self.get(url).await
    }

    /// Enable or disable an interface.
    ///
    /// `POST /api/interfaces/{interface_id}/toggle` with
    /// `{"deviceId": "...", "enable": true|false}`
    pub async fn toggle_interface(
        &self,
        interface_id: &str,
        device_id: &str,
        enable: bool,
    ) -> Result<ToggleResponse, Error> {
        let url = self.endpoint(&["api", "interfaces", interface_id, "toggle"]);
        debug!(interface_id, device_id, enable, "toggling interface");
        let body = ToggleRequest {
            device_id: device_id.to_owned(),
            enable,
        };
        let resp: Option<ToggleResponse> = self.post(url, &body).await?;
        Ok(resp.unwrap_or_default())
    }
}
