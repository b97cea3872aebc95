//! CLI arguments and subcommands for chrome-info-exporter.
//!
//! This module defines the command-line interface structure using the clap library,
//! including all flags, options, and subcommands.

use clap::{Parser, Subcommand, ValueEnum};
use std::net::IpAddr;
use std::path::PathBuf;

/// Log level options for CLI parsing
#[derive(Debug, Clone, PartialEq, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Configuration format options for output
#[derive(Debug, Clone, ValueEnum)]
pub enum ConfigFormat {
    Yaml,
    Json,
    Toml,
}

/// Main CLI arguments structure
#[derive(Parser, Debug)]
#[command(
    name = "chrome-info-exporter",
    about = "Periodic Chrome process memory report served as plain text",
    long_about = "Periodic Chrome process memory report served as plain text.\n\n\
                  Scans the process table every 3 seconds for processes named 'chrome', \
                  records their anonymous RSS and virtual size, and serves the latest \
                  report over HTTP without ever blocking readers.",
    version,
    long_version = concat!(env!("CARGO_PKG_VERSION"), " (built ", env!("VERGEN_BUILD_TIMESTAMP"), ")"),
    propagate_version = true
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// HTTP listen port
    #[arg(short = 'p', long)]
    pub port: Option<u16>,

    /// Bind to specific interface/IP
    #[arg(long)]
    pub bind: Option<IpAddr>,

    /// Log level (overrides log_level from the config file)
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Config file (YAML/JSON/TOML)
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Disable all config file loading
    #[arg(long)]
    pub no_config: bool,

    /// Print effective merged config and exit
    #[arg(long)]
    pub show_config: bool,

    /// Output format for --show-config
    #[arg(long, value_enum, default_value = "yaml")]
    pub config_format: ConfigFormat,

    /// Validate config and exit (return code 1 on error)
    #[arg(long)]
    pub check_config: bool,

    /// Root of the proc filesystem to scan
    #[arg(long)]
    pub proc_root: Option<PathBuf>,

    /// Disable /health endpoint
    #[arg(long)]
    pub disable_health: bool,

    /// Disable /metrics endpoint
    #[arg(long)]
    pub disable_metrics: bool,

    /// Path to JSON test data file (uses a synthetic process table instead of /proc)
    #[arg(short = 't', long)]
    pub test_data_file: Option<PathBuf>,
}

/// Subcommands for additional functionality
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a single scan and print the report
    Scan {
        /// Print parsed records as JSON instead of the raw report
        #[arg(long)]
        parsed: bool,
    },

    /// Validate /proc access and memory resolution
    Check,

    /// Generate a default configuration file
    Config {
        /// Output file path (stdout if omitted)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value = "yaml")]
        format: ConfigFormat,
    },
}

impl LogLevel {
    /// Parses a config file log level.
    pub fn from_config_str(level: &str) -> Option<Self> {
        <Self as ValueEnum>::from_str(level, true).ok()
    }
}
