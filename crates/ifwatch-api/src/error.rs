use thiserror::Error;

/// Top-level error type for the `ifwatch-api` crate.
///
/// Covers every failure mode of the interface management API: transport,
/// device-reported rejections, and malformed payloads. `ifwatch-core` maps
/// these into operator-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── API ─────────────────────────────────────────────────────────
    /// Non-2xx response. `message` is taken from the `{message}` error body
    /// when the server sent one.
    #[error("API error (HTTP {status}): {}", message.as_deref().unwrap_or("no details"))]
    Api {
        status: u16,
        message: Option<String>,
    },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if the request never produced an HTTP response
    /// (connection failure, DNS, timeout).
    pub fn is_unreachable(&self) -> bool {
        match self {
            Self::Transport(e) => e.status().is_none(),
            Self::Timeout { .. } | Self::Tls(_) => true,
            _ => false,
        }
    }

    /// Returns `true` if the request gave up waiting for the server.
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout(),
            Self::Timeout { .. } => true,
            _ => false,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::Api { status: 404, .. } => true,
            _ => false,
        }
    }
}
