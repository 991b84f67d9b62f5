//! CLI configuration: thin wrapper around `ifwatch_config` shared types.
//!
//! Re-exports the shared types and adds resolution that respects
//! `GlobalOpts` flag overrides (--api-url, --device, --insecure, --timeout,
//! --output, --color).

use std::time::Duration;

use clap::parser::ValueSource;
use clap::{ArgMatches, ValueEnum};
use ifwatch_core::{DeviceId, MonitorConfig, TlsVerification};

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use ifwatch_config::{
    Config, Defaults, Profile, config_path, load_config, load_config_or_default,
    profile_to_monitor_config, save_config,
};

/// Everything a command needs to talk to one device.
#[derive(Debug, Clone)]
pub struct Session {
    pub monitor: MonitorConfig,
    pub device: DeviceId,
}

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    config.active_profile_name(global.profile.as_deref())
}

/// Build the monitor configuration and pick the device from the config
/// file, the active profile, and CLI overrides.
pub fn resolve_session(global: &GlobalOpts) -> Result<Session, CliError> {
    let cfg = load_config()?;
    let profile_name = active_profile_name(global, &cfg);

    let profile = match cfg.profiles.get(&profile_name) {
        Some(profile) => Some(profile),
        // An explicitly requested profile must exist
        None if global.profile.is_some() => {
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: available_profiles(&cfg),
            });
        }
        None => None,
    };

    let monitor = match profile {
        Some(profile) => resolve_profile(profile, &cfg.defaults, global)?,
        None => resolve_flags_only(&cfg.defaults, global)?,
    };
    let device = resolve_device(global, profile)?;

    Ok(Session { monitor, device })
}

/// Translate a `Profile` + global flags into a `MonitorConfig`.
///
/// CLI flag overrides take priority over profile values.
pub fn resolve_profile(
    profile: &Profile,
    defaults: &Defaults,
    global: &GlobalOpts,
) -> Result<MonitorConfig, CliError> {
    let mut profile = profile.clone();
    if let Some(ref url) = global.api_url {
        profile.api_url.clone_from(url);
    }
    if global.insecure {
        profile.insecure = Some(true);
    }
    if global.timeout.is_some() {
        profile.timeout = global.timeout;
    }
    Ok(profile_to_monitor_config(&profile, defaults)?)
}

/// No profile: the API URL has to come from `--api-url` / `IFWATCH_API_URL`.
fn resolve_flags_only(defaults: &Defaults, global: &GlobalOpts) -> Result<MonitorConfig, CliError> {
    let url_str = global.api_url.as_deref().ok_or_else(|| CliError::NoConfig {
        path: config_path().display().to_string(),
    })?;

    let api_url: url::Url = url_str.parse().map_err(|_| CliError::Validation {
        field: "api_url".into(),
        reason: format!("invalid URL: {url_str}"),
    })?;

    let timeout = global.timeout.unwrap_or(defaults.timeout);
    if timeout == 0 {
        return Err(CliError::Validation {
            field: "timeout".into(),
            reason: "must be at least 1 second".into(),
        });
    }

    let tls = if global.insecure || defaults.insecure {
        TlsVerification::DangerAcceptInvalid
    } else {
        TlsVerification::SystemDefaults
    };

    Ok(MonitorConfig {
        api_url,
        tls,
        request_timeout: Duration::from_secs(timeout),
        poll_interval: Duration::from_secs(defaults.poll_interval),
        settle_delay: Duration::from_millis(defaults.settle_delay_ms),
    })
}

/// Take `--output` and `--color` from the config file's `[defaults]` when
/// neither the flag nor its environment variable was given.
pub fn apply_display_defaults(
    global: &mut GlobalOpts,
    matches: &ArgMatches,
    defaults: &Defaults,
) -> Result<(), CliError> {
    if left_at_default(matches, "output") {
        global.output = parse_display::<OutputFormat>("defaults.output", &defaults.output)?;
    }
    if left_at_default(matches, "color") {
        global.color = parse_display::<ColorMode>("defaults.color", &defaults.color)?;
    }
    Ok(())
}

fn left_at_default(matches: &ArgMatches, id: &str) -> bool {
    matches!(matches.value_source(id), None | Some(ValueSource::DefaultValue))
}

fn parse_display<E: ValueEnum>(field: &str, value: &str) -> Result<E, CliError> {
    E::from_str(value, true).map_err(|reason| CliError::Validation {
        field: field.into(),
        reason,
    })
}

/// Device from `--device`, else the profile's default device.
pub fn resolve_device(global: &GlobalOpts, profile: Option<&Profile>) -> Result<DeviceId, CliError> {
    global
        .device
        .clone()
        .or_else(|| profile.and_then(|p| p.device.clone()))
        .filter(|d| !d.trim().is_empty())
        .map(DeviceId::from)
        .ok_or(CliError::NoDevice)
}

/// Comma-separated profile names for error help text.
pub(crate) fn available_profiles(cfg: &Config) -> String {
    if cfg.profiles.is_empty() {
        return "(none)".into();
    }
    let mut names: Vec<&str> = cfg.profiles.keys().map(String::as_str).collect();
    names.sort_unstable();
    names.join(", ")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::{CommandFactory, FromArgMatches, Parser};

    use super::*;
    use crate::cli::Cli;

    fn global(args: &[&str]) -> GlobalOpts {
        let mut argv = vec!["ifwatch"];
        argv.extend_from_slice(args);
        argv.extend_from_slice(&["interfaces", "list"]);
        Cli::try_parse_from(argv).unwrap().global
    }

    #[test]
    fn flags_override_profile() {
        let mut profile = Profile::new("http://10.0.0.1:5000");
        profile.timeout = Some(30);
        profile.device = Some("4".into());

        let opts = global(&["--api-url", "http://127.0.0.1:8080", "--timeout", "3", "-k"]);
        let cfg = resolve_profile(&profile, &Defaults::default(), &opts).unwrap();

        assert_eq!(cfg.api_url.as_str(), "http://127.0.0.1:8080/");
        assert_eq!(cfg.request_timeout, Duration::from_secs(3));
        assert_eq!(cfg.tls, TlsVerification::DangerAcceptInvalid);
    }

    #[test]
    fn device_flag_wins_over_profile() {
        let mut profile = Profile::new("http://10.0.0.1:5000");
        profile.device = Some("4".into());

        let from_profile = resolve_device(&global(&[]), Some(&profile)).unwrap();
        assert_eq!(from_profile.as_str(), "4");

        let from_flag = resolve_device(&global(&["-d", "9"]), Some(&profile)).unwrap();
        assert_eq!(from_flag.as_str(), "9");

        assert!(matches!(
            resolve_device(&global(&[]), None),
            Err(CliError::NoDevice)
        ));
    }

    #[test]
    fn flags_only_requires_url() {
        let err = resolve_flags_only(&Defaults::default(), &global(&[])).unwrap_err();
        assert!(matches!(err, CliError::NoConfig { .. }));

        let cfg = resolve_flags_only(
            &Defaults::default(),
            &global(&["--api-url", "http://127.0.0.1:8080"]),
        )
        .unwrap();
        assert_eq!(cfg.request_timeout, Duration::from_secs(10));
        assert_eq!(cfg.poll_interval, Duration::from_secs(30));
    }

    fn parsed(args: &[&str]) -> (GlobalOpts, ArgMatches) {
        let mut argv = vec!["ifwatch"];
        argv.extend_from_slice(args);
        argv.extend_from_slice(&["interfaces", "list"]);
        let matches = Cli::command().try_get_matches_from(argv).unwrap();
        let cli = Cli::from_arg_matches(&matches).unwrap();
        (cli.global, matches)
    }

    #[test]
    fn config_defaults_fill_unset_display_flags() {
        let defaults = Defaults {
            output: "json".into(),
            color: "never".into(),
            ..Defaults::default()
        };

        let (mut opts, matches) = parsed(&[]);
        apply_display_defaults(&mut opts, &matches, &defaults).unwrap();
        assert!(matches!(opts.output, OutputFormat::Json));
        assert!(matches!(opts.color, ColorMode::Never));

        let (mut opts, matches) = parsed(&["-o", "yaml", "--color", "always"]);
        apply_display_defaults(&mut opts, &matches, &defaults).unwrap();
        assert!(matches!(opts.output, OutputFormat::Yaml));
        assert!(matches!(opts.color, ColorMode::Always));
    }

    #[test]
    fn unknown_config_output_is_validation_error() {
        let defaults = Defaults {
            output: "xml".into(),
            ..Defaults::default()
        };
        let (mut opts, matches) = parsed(&[]);

        let err = apply_display_defaults(&mut opts, &matches, &defaults).unwrap_err();
        assert!(matches!(err, CliError::Validation { ref field, .. } if field == "defaults.output"));
    }

    #[test]
    fn zero_timeout_rejected() {
        let err = resolve_flags_only(
            &Defaults::default(),
            &global(&["--api-url", "http://127.0.0.1:8080", "--timeout", "0"]),
        )
        .unwrap_err();
        assert!(matches!(err, CliError::Validation { .. }));
    }
}
