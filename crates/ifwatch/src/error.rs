//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use ifwatch_config::ConfigError;
use ifwatch_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
    pub const REJECTED: i32 = 9;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the interface API")]
    #[diagnostic(
        code(ifwatch::connection_failed),
        help(
            "Check that the interface API is running and reachable.\n\
             Reason: {reason}\n\
             Self-signed certificate? Try --insecure (-k)."
        )
    )]
    ConnectionFailed { reason: String },

    #[error("Could not load interfaces for device '{device}'")]
    #[diagnostic(
        code(ifwatch::fetch_failed),
        help(
            "Reason: {reason}\n\
             Check the device id and that the API can reach the device."
        )
    )]
    FetchFailed { device: String, reason: String },

    #[error("Request timed out")]
    #[diagnostic(
        code(ifwatch::timeout),
        help("Increase the timeout with --timeout or check device responsiveness.\n{reason}")
    )]
    Timeout { reason: String },

    // ── Control ──────────────────────────────────────────────────────
    #[error("Device rejected the command: {message}")]
    #[diagnostic(code(ifwatch::rejected))]
    Rejected { message: String },

    #[error("A toggle for interface '{interface}' is already in progress")]
    #[diagnostic(
        code(ifwatch::busy),
        help("Wait for the current command to finish and try again.")
    )]
    Busy { interface: String },

    #[error("Device selection changed before device '{device}' answered")]
    #[diagnostic(
        code(ifwatch::selection_changed),
        help("The command may have been applied. Check with: ifwatch interfaces list")
    )]
    SelectionChanged { device: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(ifwatch::not_found),
        help("Run: ifwatch {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("No device selected")]
    #[diagnostic(
        code(ifwatch::no_device),
        help(
            "Pass --device <ID>, set IFWATCH_DEVICE, or store one in the profile:\n\
             ifwatch config set device <ID>"
        )
    )]
    NoDevice,

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(ifwatch::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(ifwatch::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: ifwatch config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No interface API configured")]
    #[diagnostic(
        code(ifwatch::no_config),
        help(
            "Create a profile with: ifwatch config init\n\
             Or pass --api-url / set IFWATCH_API_URL.\n\
             Expected at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(ifwatch::config))]
    Config(Box<ConfigError>),

    // ── Internal ─────────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(code(ifwatch::internal))]
    Internal { message: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML serialization failed: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            other => Self::Config(Box::new(other)),
        }
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::FetchFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Rejected { .. } => exit_code::REJECTED,
            Self::Busy { .. } | Self::SelectionChanged { .. } => exit_code::CONFLICT,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::NoDevice | Self::Validation { .. } | Self::ProfileNotFound { .. } => {
                exit_code::USAGE
            }
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Fetch { device_id, reason } => Self::FetchFailed {
                device: device_id.to_string(),
                reason,
            },
            CoreError::Toggle { message } => Self::Rejected { message },
            CoreError::Transport {
                reason,
                timed_out: true,
            } => Self::Timeout { reason },
            CoreError::Transport { reason, .. } => Self::ConnectionFailed { reason },
            CoreError::Busy { interface_id } => Self::Busy {
                interface: interface_id.to_string(),
            },
            CoreError::NoDeviceSelected => Self::NoDevice,
            CoreError::SelectionChanged { device_id } => Self::SelectionChanged {
                device: device_id.to_string(),
            },
            CoreError::Config { message } => Self::Validation {
                field: "config".into(),
                reason: message,
            },
            CoreError::Internal(message) => Self::Internal { message },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_core_errors() {
        let busy = CliError::from(CoreError::Busy {
            interface_id: "1".into(),
        });
        assert_eq!(busy.exit_code(), exit_code::CONFLICT);

        let rejected = CliError::from(CoreError::Toggle {
            message: "Failed to connect to device".into(),
        });
        assert_eq!(rejected.exit_code(), exit_code::REJECTED);
        assert_eq!(
            rejected.to_string(),
            "Device rejected the command: Failed to connect to device"
        );

        let timeout = CliError::from(CoreError::Transport {
            reason: "Request timed out after 10s".into(),
            timed_out: true,
        });
        assert_eq!(timeout.exit_code(), exit_code::TIMEOUT);

        let down = CliError::from(CoreError::Transport {
            reason: "connection refused".into(),
            timed_out: false,
        });
        assert_eq!(down.exit_code(), exit_code::CONNECTION);

        assert_eq!(CliError::from(CoreError::NoDeviceSelected).exit_code(), exit_code::USAGE);

        let moved = CliError::from(CoreError::SelectionChanged {
            device_id: "7".into(),
        });
        assert_eq!(moved.exit_code(), exit_code::CONFLICT);
    }

    #[test]
    fn config_validation_is_usage_error() {
        let err = CliError::from(ConfigError::Validation {
            field: "api_url".into(),
            reason: "invalid URL".into(),
        });
        assert_eq!(err.exit_code(), exit_code::USAGE);
    }
}
