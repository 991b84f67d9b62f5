//! Clap derive structures for the `ifwatch` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// ifwatch -- watch and toggle network interfaces on managed devices
#[derive(Debug, Parser)]
#[command(
    name = "ifwatch",
    version,
    about = "Monitor and enable/disable network interfaces on managed devices",
    long_about = "Polls a device's interfaces through the interface management API,\n\
        derives a trustworthy up/down status (wireless and CAP interfaces\n\
        included), and sends enable/disable commands, re-reading the device\n\
        after each change instead of guessing.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Configuration profile to use
    #[arg(long, short = 'p', env = "IFWATCH_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Interface API base URL (overrides profile)
    #[arg(long, short = 'u', env = "IFWATCH_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Device to operate on (overrides profile)
    #[arg(long, short = 'd', env = "IFWATCH_DEVICE", global = true)]
    pub device: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "IFWATCH_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "IFWATCH_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "IFWATCH_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List, inspect, enable and disable interfaces
    #[command(alias = "if", alias = "i")]
    Interfaces(InterfacesArgs),

    /// Live view of the selected device, refreshed on every poll
    #[command(alias = "w")]
    Watch(WatchArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Interfaces ───────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct InterfacesArgs {
    #[command(subcommand)]
    pub command: InterfacesCommand,
}

#[derive(Debug, Subcommand)]
pub enum InterfacesCommand {
    /// List all interfaces of the device
    #[command(alias = "ls")]
    List,

    /// Show one interface
    Get {
        /// Interface ID or name
        interface: String,
    },

    /// Administratively enable an interface
    Enable(ToggleArgs),

    /// Administratively disable an interface
    Disable(ToggleArgs),
}

#[derive(Debug, Args)]
pub struct ToggleArgs {
    /// Interface ID or name
    pub interface: String,

    /// Return after the device accepts the command, without waiting to
    /// re-read its state
    #[arg(long)]
    pub no_wait: bool,
}

// ── Watch ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Poll interval (e.g. 10s, 1m); defaults to the profile setting
    #[arg(long, short = 'i', value_parser = humantime::parse_duration)]
    pub interval: Option<Duration>,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Interactive configuration wizard
    Init,

    /// Display current resolved configuration
    Show,

    /// Print the configuration file path
    Path,

    /// Set a configuration value on the active profile
    Set {
        /// Config key (api_url, device, insecure, ca_cert, timeout,
        /// poll_interval, settle_delay_ms)
        key: String,

        /// Value to set
        value: String,
    },

    /// List configured profiles
    Profiles,

    /// Switch the default profile
    Use {
        /// Profile name
        name: String,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
