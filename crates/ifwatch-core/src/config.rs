// ── Runtime monitor configuration ──
//
// These types describe how to reach the interface API and how often to
// talk to it. They never touch disk: the CLI builds a `MonitorConfig`
// (usually via ifwatch-config) and hands it in.

use std::time::Duration;

use url::Url;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(2);

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (self-signed management hosts).
    DangerAcceptInvalid,
}

/// Configuration for one monitoring session.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Base URL of the interface API (e.g., `http://192.168.88.10:5000`).
    pub api_url: Url,
    pub tls: TlsVerification,
    /// Upper bound on every API call, enforced in addition to the HTTP
    /// client's own timeout.
    pub request_timeout: Duration,
    /// How often the selected device is re-polled. Zero disables polling.
    pub poll_interval: Duration,
    /// Wait between a successful toggle and the reconciling reload.
    pub settle_delay: Duration,
}

impl MonitorConfig {
    pub fn new(api_url: Url) -> Self {
        Self {
            api_url,
            tls: TlsVerification::default(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }

    /// Build the HTTP transport settings for `ifwatch_api`.
    pub fn transport(&self) -> ifwatch_api::TransportConfig {
        ifwatch_api::TransportConfig {
            tls: match &self.tls {
                TlsVerification::SystemDefaults => ifwatch_api::TlsMode::System,
                TlsVerification::CustomCa(path) => ifwatch_api::TlsMode::CustomCa(path.clone()),
                TlsVerification::DangerAcceptInvalid => ifwatch_api::TlsMode::DangerAcceptInvalid,
            },
            timeout: self.request_timeout,
        }
    }
}
