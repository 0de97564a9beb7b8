//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Syslog Server - RFC 3164 syslog ingestion over UDP and local datagram sockets
#[derive(Parser, Debug)]
#[command(
    name = "syslog-server",
    author,
    version,
    about = "RFC 3164 syslog ingestion server",
    long_about = "Receives BSD syslog datagrams over UDP and local datagram sockets,\n\
                  parses them into records, and passes each record through an ordered\n\
                  chain of handlers configured in a TOML or JSON file."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "SYSLOG_SERVER_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "SYSLOG_SERVER_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the server until interrupted
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(
        short,
        long,
        default_value = "server.toml",
        env = "SYSLOG_SERVER_CONFIG"
    )]
    pub config: PathBuf,

    /// Additional address to listen on (`host:port` or socket path), repeatable
    #[arg(short, long = "listen", value_name = "ADDR")]
    pub listen: Vec<String>,

    /// Stop after this many seconds (0 = run until interrupted)
    #[arg(long, default_value = "0", env = "SYSLOG_SERVER_TIMEOUT")]
    pub timeout: u64,

    /// Validate configuration and exit without listening
    #[arg(long)]
    pub dry_run: bool,

    /// Interval in seconds between handler metric reports (0 = disabled)
    #[arg(long, default_value = "10", env = "SYSLOG_SERVER_REPORT_INTERVAL")]
    pub report_interval: u64,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "SYSLOG_SERVER_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "server.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "server.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}
