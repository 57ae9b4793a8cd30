//! Clap derive structures for the `netaudit` CLI.
//!
//! Defines the command tree, global flags, and shared value enums.

use std::net::IpAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use netaudit_core::CommandStyle;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// netaudit -- watch and control a network intrusion audit service
#[derive(Debug, Parser)]
#[command(
    name = "netaudit",
    version,
    about = "Monitor network devices reported by an intrusion audit service",
    long_about = "Polls an audit service for its device snapshot, reports blocked and\n\
        alerting devices, and sends block / unblock / limit commands.",
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
    /// Service profile to use
    #[arg(long, short = 'p', env = "NETAUDIT_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Audit service base URL, including the API prefix (overrides profile)
    #[arg(long, short = 'u', env = "NETAUDIT_URL", global = true)]
    pub url: Option<String>,

    /// Config file (defaults to the platform config directory)
    #[arg(long, env = "NETAUDIT_CONFIG", global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "NETAUDIT_OUTPUT",
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
    #[arg(long, short = 'k', env = "NETAUDIT_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "NETAUDIT_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Poll interval in milliseconds (overrides profile)
    #[arg(long, env = "NETAUDIT_INTERVAL_MS", global = true)]
    pub interval_ms: Option<u64>,

    /// Command surface exposed by the service (overrides profile)
    #[arg(long, global = true)]
    pub command_style: Option<StyleArg>,
}

// ── Value Enums ──────────────────────────────────────────────────────

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

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StyleArg {
    /// POST /device_action with { ip, action, limit }
    Unified,
    /// POST /device/{ip}/{block|unblock}
    PerDevice,
}

impl From<StyleArg> for CommandStyle {
    fn from(arg: StyleArg) -> Self {
        match arg {
            StyleArg::Unified => Self::Unified,
            StyleArg::PerDevice => Self::PerDevice,
        }
    }
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the system indicator and a device summary (single fetch)
    #[command(alias = "st")]
    Status,

    /// Inspect and control monitored devices
    #[command(alias = "dev", alias = "d")]
    Devices(DevicesArgs),

    /// Poll continuously, printing audit log entries as they happen
    #[command(alias = "w")]
    Watch(WatchArgs),

    /// Reset all state held by the audit service
    Reset,

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Devices ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DevicesArgs {
    #[command(subcommand)]
    pub command: DevicesCommand,
}

#[derive(Debug, Subcommand)]
pub enum DevicesCommand {
    /// List monitored devices
    #[command(alias = "ls")]
    List {
        /// Only show devices in this status (connected, alert, blocked)
        #[arg(long, short = 's')]
        status: Option<String>,
    },

    /// Show one device in detail
    Get {
        /// Device IP address
        ip: IpAddr,
    },

    /// Block a device
    Block {
        /// Device IP address
        ip: IpAddr,
    },

    /// Unblock a device
    Unblock {
        /// Device IP address
        ip: IpAddr,
    },

    /// Set a device's packet-rate limit
    Limit {
        /// Device IP address
        ip: IpAddr,

        /// Packets per detection window (greater than zero)
        limit: u64,
    },
}

// ── Watch ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Keep a live detail view of this device
    #[arg(long, short = 'f', value_name = "IP")]
    pub follow: Option<IpAddr>,

    /// Write diagnostics to this file instead of stderr
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file location
    Path,

    /// Display current resolved configuration
    Show,

    /// Create a config file with a single profile
    Init {
        /// Name of the profile to create
        #[arg(long, default_value = "default")]
        name: String,

        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
