//! Configuration types for snapshot buffer health monitoring.
//!
//! This module provides configuration structures for tracking how full the
//! snapshot buffer is and determining its health status.

use serde::Deserialize;

use crate::scanner::SNAPSHOT_CAPACITY;

/// Configuration for a single buffer's health monitoring.
///
/// Each buffer can be configured with its capacity, whether larger fill levels
/// are considered better, and optional threshold percentages for warning and
/// critical status levels.
#[derive(Debug, Clone, Deserialize)]
pub struct BufferHealthConfig {
    /// Maximum capacity of the buffer in bytes.
    pub capacity_bytes: usize,
    /// If true, higher fill percentages are considered healthy.
    /// If false, lower fill percentages are considered healthy.
    pub larger_is_better: bool,
    /// Optional warning threshold as a percentage.
    /// For `larger_is_better=false`: warn when fill_percent > warn_percent
    /// For `larger_is_better=true`: warn when fill_percent < warn_percent
    pub warn_percent: Option<f64>,
    /// Optional critical threshold as a percentage.
    /// For `larger_is_better=false`: critical when fill_percent > critical_percent
    /// For `larger_is_better=true`: critical when fill_percent < critical_percent
    pub critical_percent: Option<f64>,
}

impl Default for BufferHealthConfig {
    fn default() -> Self {
        Self {
            capacity_bytes: SNAPSHOT_CAPACITY,
            larger_is_better: false,
            warn_percent: None,
            critical_percent: None,
        }
    }
}

/// Application-wide buffer health configuration.
///
/// - `snapshot_buffer`: bytes actually published in the snapshot
/// - `report_demand`: bytes the last report needed before clipping,
///   measured against the `SNAPSHOT_CAPACITY - 1` bytes a report can hold
///   (the last slot is the NUL). Above 100% means output was dropped.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub snapshot_buffer: BufferHealthConfig,
    pub report_demand: BufferHealthConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            snapshot_buffer: BufferHealthConfig {
                capacity_bytes: SNAPSHOT_CAPACITY,
                larger_is_better: false,
                warn_percent: Some(80.0),
                critical_percent: Some(95.0),
            },
            report_demand: BufferHealthConfig {
                capacity_bytes: SNAPSHOT_CAPACITY - 1,
                larger_is_better: false,
                warn_percent: Some(90.0),
                critical_percent: Some(100.0),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_health_config_default() {
        let config = BufferHealthConfig::default();
        assert_eq!(config.capacity_bytes, 8192);
        assert!(!config.larger_is_better);
        assert!(config.warn_percent.is_none());
        assert!(config.critical_percent.is_none());
    }

    #[test]
    fn test_app_config_default() {
        let config = AppConfig::default();
        assert_eq!(config.snapshot_buffer.capacity_bytes, 8192);
        assert_eq!(config.report_demand.critical_percent, Some(100.0));
        assert_eq!(config.report_demand.capacity_bytes, 8191);
    }
}
