//! Config command implementation.
//!
//! Generates configuration files in various formats.

use std::fs;
use std::path::PathBuf;

use crate::cli::ConfigFormat;
use crate::config::{render_config, Config};

/// Generates a configuration file holding the defaults.
pub fn command_config(
    output: Option<PathBuf>,
    format: ConfigFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();
    let mut content = render_config(&config, &format)?;
    if matches!(format, ConfigFormat::Yaml) {
        content = add_config_comments(content);
    }

    match output {
        Some(path) if path.to_string_lossy() != "-" => {
            fs::write(&path, content)?;
            println!("✅ Configuration written to: {}", path.display());
        }
        _ => print!("{}", content),
    }

    Ok(())
}

/// Adds comments to YAML configuration.
fn add_config_comments(yaml: String) -> String {
    let comments = r#"# Chrome Info Exporter Configuration
# ==================================
#
# Server Configuration
# --------------------
# bind: "0.0.0.0"              # Bind IP (0.0.0.0 = all interfaces)
# port: 9216                   # HTTP port
#
# Process Source
# --------------
# proc_root: "/proc"           # Root of the proc filesystem
# test_data_file: null         # JSON process table used instead of proc_root
#
# Feature Flags
# -------------
# enable_health: true          # Enable /health endpoint
# enable_metrics: true         # Enable /metrics endpoint
#
# Logging
# -------
# log_level: "info"            # off, error, warn, info, debug, trace
"#;

    format!("{comments}\n{yaml}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writes_parseable_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.yaml");
        command_config(Some(path.clone()), ConfigFormat::Yaml).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("# Chrome Info Exporter Configuration"));
        let parsed = crate::config::parse_config(&content, &path).unwrap();
        assert_eq!(parsed, Config::default());
    }
}
