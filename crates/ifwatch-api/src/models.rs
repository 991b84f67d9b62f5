// Wire types for the interface management API.
//
// Field names follow the API's camelCase JSON. Everything the device may
// omit is optional here; canonical defaults are applied in ifwatch-core.

use serde::{Deserialize, Deserializer, Serialize};

/// One interface as returned by `GET /api/devices/{id}/interfaces`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawInterface {
    /// Numeric or string identifier, normalized to a string.
    #[serde(deserialize_with = "id_from_number_or_string")]
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub is_up: Option<bool>,
    #[serde(default)]
    pub mac_address: Option<String>,
    #[serde(default)]
    pub speed: Option<String>,
    #[serde(default, deserialize_with = "counter")]
    pub rx_bytes: Option<u64>,
    #[serde(default, deserialize_with = "counter")]
    pub tx_bytes: Option<u64>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub disabled: Option<bool>,
}

/// Body of `POST /api/interfaces/{id}/toggle`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleRequest {
    pub device_id: String,
    pub enable: bool,
}

/// Body of a 2xx toggle reply.
///
/// Some devices answer with a 2xx status but report the refusal in the
/// payload (`{"success": false, "error": "..."}`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ToggleResponse {
    /// True when the payload reports that the device refused the change.
    pub fn is_refusal(&self) -> bool {
        self.success == Some(false) || self.error.as_deref().is_some_and(|e| !e.trim().is_empty())
    }
}

fn id_from_number_or_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {other}"
        ))),
    }
}

/// Byte counters arrive as JSON numbers from most devices, but RouterOS
/// REST reports them as decimal strings.
fn counter<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::Number(n)) => n
            .as_u64()
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid byte counter {n}"))),
        Some(serde_json::Value::String(s)) => s
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|e| serde::de::Error::custom(format!("invalid byte counter {s:?}: {e}"))),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected byte counter, got {other}"
        ))),
    }
}
