// Interface management API HTTP client
//
// Wraps `reqwest::Client` with URL construction and response/error-body
// handling. Endpoint methods live in `interfaces.rs` as inherent methods
// to keep this module focused on transport mechanics.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

// ── Error response shape ─────────────────────────────────────────────

#[derive(serde::Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the interface management API.
///
/// All paths are resolved under `base_url`; path segments (device and
/// interface identifiers) are percent-encoded, so RouterOS-style ids such as
/// `*1` survive the trip intact.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    /// Build a client from a base URL and transport config.
    pub fn new(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::from_reqwest(base_url, http)
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(Error::InvalidUrl(
                url::ParseError::RelativeUrlWithCannotBeABaseBase,
            ));
        }
        Ok(Self { http, base_url })
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Append percent-encoded path segments to the base URL.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // Checked in the constructor: the base URL can always carry a path.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    pub(crate) async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {url}");

        let resp = self.http.get(url).send().await?;
        self.handle_response(resp).await
    }

    pub(crate) async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<T, Error> {
        debug!("POST {url}");

        let resp = self.http.post(url).json(body).send().await?;
        self.handle_response(resp).await
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            // An empty 2xx body reads as JSON `null`, so `Option<T>` callers get `None`.
            let text = if body.trim().is_empty() { "null" } else { body.as_str() };
            serde_json::from_str(text).map_err(|e| {
                let preview = body.chars().take(200).collect::<String>();
                Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body,
                }
            })
        } else {
            Err(self.parse_error(status, resp).await)
        }
    }

    async fn parse_error(&self, status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        let raw = resp.text().await.unwrap_or_default();

        let message = match serde_json::from_str::<ErrorResponse>(&raw) {
            Ok(err) => err.message.or(err.error),
            Err(_) if raw.trim().is_empty() => None,
            Err(_) => Some(raw.trim().to_owned()),
        };

        debug!(status = status.as_u16(), ?message, "request rejected");
        Error::Api {
            status: status.as_u16(),
            message: message.filter(|m| !m.is_empty()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::from_reqwest(base, reqwest::Client::new()).unwrap()
    }

    #[test]
    fn endpoint_appends_segments() {
        let c = client("http://192.168.88.1:5000");
        let url = c.endpoint(&["api", "devices", "7", "interfaces"]);
        assert_eq!(url.as_str(), "http://192.168.88.1:5000/api/devices/7/interfaces");
    }

    #[test]
    fn endpoint_keeps_base_path_prefix() {
        let c = client("https://dash.example.net/netops/");
        let url = c.endpoint(&["api", "interfaces", "12", "toggle"]);
        assert_eq!(url.path(), "/netops/api/interfaces/12/toggle");
    }

    #[test]
    fn endpoint_encodes_identifiers() {
        let c = client("http://localhost");
        let url = c.endpoint(&["api", "interfaces", "*1/x", "toggle"]);
        assert_eq!(url.path(), "/api/interfaces/*1%2Fx/toggle");
    }

    #[test]
    fn rejects_cannot_be_a_base_url() {
        let result = ApiClient::from_reqwest("mailto:ops@example.net", reqwest::Client::new());
        assert!(matches!(result, Err(Error::InvalidUrl(_))));
    }
}
