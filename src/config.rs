//! Configuration management for chrome-info-exporter.
//!
//! This module handles loading, merging, and validating configuration from files
//! and CLI arguments. It supports YAML, JSON, and TOML formats.
//!
//! The scan target, interval and snapshot capacity are compile-time constants
//! in `chrome_info_exporter::scanner` and deliberately absent here.

use crate::cli::{Args, ConfigFormat};
use clap::ValueEnum;
use chrome_info_exporter::process::DEFAULT_PROC_ROOT;
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use tracing::info;

// Default configuration constants
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 9216;

/// Exporter configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    // Server configuration
    pub port: Option<u16>,
    pub bind: Option<String>,

    // Process source
    #[serde(alias = "proc-root")]
    pub proc_root: Option<PathBuf>,
    /// Path to JSON test data file (uses synthetic data instead of /proc)
    #[serde(alias = "test-data-file")]
    pub test_data_file: Option<PathBuf>,

    // Feature flags
    #[serde(alias = "enable-health")]
    pub enable_health: Option<bool>,
    #[serde(alias = "enable-metrics")]
    pub enable_metrics: Option<bool>,

    // Logging
    #[serde(alias = "log-level")]
    pub log_level: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: Some(DEFAULT_BIND_ADDR.to_string()),
            port: Some(DEFAULT_PORT),
            proc_root: Some(PathBuf::from(DEFAULT_PROC_ROOT)),
            test_data_file: None,
            enable_health: Some(true),
            enable_metrics: Some(true),
            log_level: Some("info".into()),
        }
    }
}

impl Config {
    pub fn proc_root(&self) -> PathBuf {
        self.proc_root
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PROC_ROOT))
    }
}

/// Validate effective config (used by --check-config and at startup)
pub fn validate_effective_config(cfg: &Config) -> Result<(), Box<dyn std::error::Error>> {
    if cfg.port == Some(0) {
        return Err("port must be between 1 and 65535".into());
    }

    if let Some(bind) = cfg.bind.as_deref() {
        if bind.parse::<IpAddr>().is_err() {
            return Err(format!("Invalid bind address '{}'", bind).into());
        }
    }

    match &cfg.test_data_file {
        Some(path) => {
            if !path.exists() {
                return Err(format!("Test data file not found: {}", path.display()).into());
            }
        }
        None => {
            let root = cfg.proc_root();
            if !root.is_dir() {
                return Err(format!("proc root is not a directory: {}", root.display()).into());
            }
        }
    }

    if let Some(level) = cfg.log_level.as_deref() {
        match level {
            "off" | "error" | "warn" | "info" | "debug" | "trace" => {}
            other => {
                return Err(format!(
                    "Invalid log_level '{}', expected off/error/warn/info/debug/trace",
                    other
                )
                .into());
            }
        }
    }

    Ok(())
}

/// Resolves configuration from CLI args, config file, and defaults.
/// This enforces precedence: CLI (if provided) > config file > default.
pub fn resolve_config(args: &Args) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = if args.no_config {
        Config::default()
    } else {
        load_config(args.config.as_deref())?
    };

    if let Some(bind_ip) = args.bind {
        config.bind = Some(bind_ip.to_string());
    }
    if let Some(cli_port) = args.port {
        config.port = Some(cli_port);
    }
    if let Some(root) = &args.proc_root {
        config.proc_root = Some(root.clone());
    }
    if let Some(test_file) = &args.test_data_file {
        config.test_data_file = Some(test_file.clone());
    }
    if let Some(level) = args.log_level.as_ref().and_then(|l| l.to_possible_value()) {
        config.log_level = Some(level.get_name().to_string());
    }

    // Feature flags
    if args.disable_health {
        config.enable_health = Some(false);
    }
    if args.disable_metrics {
        config.enable_metrics = Some(false);
    }

    Ok(config)
}

/// Configuration loading with multiple format support.
///
/// Without an explicit path the default locations are tried; if none exists
/// the defaults are used.
pub fn load_config(path: Option<&Path>) -> Result<Config, Box<dyn std::error::Error>> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => {
            let defaults = [
                "/etc/chrome-info-exporter/config.yaml",
                "/etc/chrome-info-exporter/config.yml",
                "/etc/chrome-info-exporter/config.json",
                "./chrome-info-exporter.yaml",
                "./chrome-info-exporter.yml",
                "./chrome-info-exporter.json",
            ];
            match defaults.iter().find(|p| Path::new(p).exists()) {
                Some(p) => PathBuf::from(p),
                None => return Ok(Config::default()),
            }
        }
    };

    let content = fs::read_to_string(&path)?;
    let config = parse_config(&content, &path)?;
    info!("Loaded configuration from: {}", path.display());
    Ok(config)
}

/// Parses config content, picking the format from the file extension.
pub fn parse_config(content: &str, path: &Path) -> Result<Config, Box<dyn std::error::Error>> {
    let config: Config = match path.extension().and_then(|s| s.to_str()) {
        Some("json") => serde_json::from_str(content)?,
        Some("toml") => toml::from_str(content)?,
        // Default to YAML
        _ => serde_yaml::from_str(content)?,
    };
    Ok(config)
}

/// Renders configuration in the requested format.
pub fn render_config(
    config: &Config,
    format: &ConfigFormat,
) -> Result<String, Box<dyn std::error::Error>> {
    let output = match format {
        ConfigFormat::Json => serde_json::to_string_pretty(config)?,
        ConfigFormat::Toml => toml::to_string_pretty(config)?,
        ConfigFormat::Yaml => serde_yaml::to_string(config)?,
    };
    Ok(output)
}

/// Shows configuration in requested format
pub fn show_config(config: &Config, format: ConfigFormat) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", render_config(config, &format)?);
    Ok(())
}
