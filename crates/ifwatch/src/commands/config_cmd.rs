//! Config subcommand handlers.

use dialoguer::Input;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

const VALID_KEYS: &str =
    "api_url, device, insecure, ca_cert, timeout, poll_interval, settle_delay_ms";

// ── Helpers ─────────────────────────────────────────────────────────

/// Format config for display as TOML-like text, profiles sorted by name.
fn format_config(cfg: &Config) -> String {
    use std::fmt::Write;
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "color = \"{}\"", cfg.defaults.color);
    let _ = writeln!(out, "insecure = {}", cfg.defaults.insecure);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);
    let _ = writeln!(out, "poll_interval = {}", cfg.defaults.poll_interval);
    let _ = writeln!(out, "settle_delay_ms = {}", cfg.defaults.settle_delay_ms);

    let mut names: Vec<_> = cfg.profiles.keys().collect();
    names.sort();
    for name in names {
        let p = &cfg.profiles[name];
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        let _ = writeln!(out, "api_url = \"{}\"", p.api_url);
        if let Some(ref device) = p.device {
            let _ = writeln!(out, "device = \"{device}\"");
        }
        if let Some(ref ca) = p.ca_cert {
            let _ = writeln!(out, "ca_cert = \"{}\"", ca.display());
        }
        if let Some(insecure) = p.insecure {
            let _ = writeln!(out, "insecure = {insecure}");
        }
        if let Some(timeout) = p.timeout {
            let _ = writeln!(out, "timeout = {timeout}");
        }
        if let Some(interval) = p.poll_interval {
            let _ = writeln!(out, "poll_interval = {interval}");
        }
        if let Some(delay) = p.settle_delay_ms {
            let _ = writeln!(out, "settle_delay_ms = {delay}");
        }
    }

    out
}

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn validate_url(value: &str) -> Result<(), CliError> {
    value
        .parse::<url::Url>()
        .map(|_| ())
        .map_err(|e| CliError::Validation {
            field: "api_url".into(),
            reason: format!("invalid URL '{value}': {e}"),
        })
}

fn parse_number(field: &str, value: &str, unit: &str) -> Result<u64, CliError> {
    value.parse().map_err(|_| CliError::Validation {
        field: field.into(),
        reason: format!("must be a number ({unit})"),
    })
}

/// Apply one `config set` assignment to a profile.
fn apply_setting(profile: &mut Profile, key: &str, value: String) -> Result<(), CliError> {
    match key {
        "api_url" | "api-url" => {
            validate_url(&value)?;
            profile.api_url = value;
        }
        "device" => profile.device = Some(value),
        "insecure" => {
            profile.insecure = Some(value.parse().map_err(|_| CliError::Validation {
                field: "insecure".into(),
                reason: "must be 'true' or 'false'".into(),
            })?);
        }
        "ca_cert" | "ca-cert" => profile.ca_cert = Some(value.into()),
        "timeout" => {
            let secs = parse_number("timeout", &value, "seconds")?;
            if secs == 0 {
                return Err(CliError::Validation {
                    field: "timeout".into(),
                    reason: "must be at least 1 second".into(),
                });
            }
            profile.timeout = Some(secs);
        }
        "poll_interval" | "poll-interval" => {
            profile.poll_interval = Some(parse_number("poll_interval", &value, "seconds")?);
        }
        "settle_delay_ms" | "settle-delay-ms" => {
            profile.settle_delay_ms = Some(parse_number("settle_delay_ms", &value, "milliseconds")?);
        }
        other => {
            return Err(CliError::Validation {
                field: other.into(),
                reason: format!("unknown config key '{other}'. Valid keys: {VALID_KEYS}"),
            });
        }
    }
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init => {
            let config_path = config::config_path();
            eprintln!("ifwatch configuration wizard");
            eprintln!("   Config path: {}\n", config_path.display());

            let profile_name: String = Input::new()
                .with_prompt("Profile name")
                .default("default".into())
                .interact_text()
                .map_err(prompt_err)?;

            let api_url: String = Input::new()
                .with_prompt("Interface API URL")
                .default("http://127.0.0.1:5000".into())
                .validate_with(|input: &String| validate_url(input).map_err(|e| e.to_string()))
                .interact_text()
                .map_err(prompt_err)?;

            let device: String = Input::new()
                .with_prompt("Default device ID (empty for none)")
                .allow_empty(true)
                .interact_text()
                .map_err(prompt_err)?;

            let mut profile = Profile::new(api_url);
            if !device.trim().is_empty() {
                profile.device = Some(device.trim().to_owned());
            }

            // Keep other profiles from an existing file
            let mut cfg = config::load_config_or_default();
            cfg.profiles.insert(profile_name.clone(), profile);
            cfg.default_profile = Some(profile_name.clone());
            config::save_config(&cfg)?;

            eprintln!("\nConfiguration written to {}", config_path.display());
            eprintln!("  Active profile: {profile_name}");
            eprintln!("\n  Test it: ifwatch interfaces list");
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = config::load_config_or_default();
            let out =
                output::render_single(&global.output, &cfg, format_config, |_| "config".into())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::Set { key, value } => {
            let mut cfg = config::load_config()?;
            let profile_name = config::active_profile_name(global, &cfg);

            let profile = cfg
                .profiles
                .entry(profile_name.clone())
                .or_insert_with(|| Profile::new(String::new()));
            apply_setting(profile, &key, value)?;

            config::save_config(&cfg)?;
            if !global.quiet {
                eprintln!("Set {key} on profile '{profile_name}'");
            }
            Ok(())
        }

        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default();
            let default = cfg.default_profile.as_deref().unwrap_or("default");
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: ifwatch config init");
            } else {
                let mut names: Vec<_> = cfg.profiles.keys().collect();
                names.sort();
                for name in names {
                    let marker = if name == default { " *" } else { "" };
                    println!("{name}{marker}");
                }
            }
            Ok(())
        }

        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config()?;

            if !cfg.profiles.contains_key(&name) {
                return Err(CliError::ProfileNotFound {
                    name,
                    available: config::available_profiles(&cfg),
                });
            }

            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg)?;
            if !global.quiet {
                eprintln!("Default profile set to '{name}'");
            }
            Ok(())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn set_known_keys() {
        let mut p = Profile::new("http://10.0.0.1:5000");
        apply_setting(&mut p, "device", "7".into()).unwrap();
        apply_setting(&mut p, "insecure", "true".into()).unwrap();
        apply_setting(&mut p, "poll-interval", "15".into()).unwrap();
        apply_setting(&mut p, "settle_delay_ms", "500".into()).unwrap();

        assert_eq!(p.device.as_deref(), Some("7"));
        assert_eq!(p.insecure, Some(true));
        assert_eq!(p.poll_interval, Some(15));
        assert_eq!(p.settle_delay_ms, Some(500));
    }

    #[test]
    fn set_rejects_bad_values() {
        let mut p = Profile::new("http://10.0.0.1:5000");
        assert!(apply_setting(&mut p, "api_url", "not a url".into()).is_err());
        assert!(apply_setting(&mut p, "timeout", "0".into()).is_err());
        assert!(apply_setting(&mut p, "timeout", "soon".into()).is_err());
        assert!(matches!(
            apply_setting(&mut p, "colour", "red".into()),
            Err(CliError::Validation { field, .. }) if field == "colour"
        ));
        assert_eq!(p.api_url, "http://10.0.0.1:5000");
    }

    #[test]
    fn show_sorts_profiles() {
        let mut cfg = Config::default();
        cfg.profiles.insert("lab".into(), Profile::new("http://10.0.0.2:5000"));
        cfg.profiles.insert("core".into(), Profile::new("http://10.0.0.1:5000"));

        let text = format_config(&cfg);
        let core = text.find("[profiles.core]").unwrap();
        let lab = text.find("[profiles.lab]").unwrap();
        assert!(core < lab);
        assert!(text.contains("default_profile = \"default\""));
    }
}
