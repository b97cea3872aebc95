//! Health monitoring for the snapshot buffer fill level.
//!
//! The scanner reports two numbers after every pass: how many bytes were
//! published and how many the full, unclipped report would have needed.
//! Both are compared against the configured capacity.
//!
//! # Usage
//!
//! ```rust
//! use chrome_info_exporter::{AppConfig, HealthState};
//!
//! let health_state = HealthState::new(AppConfig::default());
//! health_state.update_snapshot_bytes(1024);
//! health_state.update_report_demand_bytes(1024);
//!
//! let response = health_state.get_health();
//! println!("Overall status: {}", response.overall_status);
//! ```

use crate::health_config::{AppConfig, BufferHealthConfig};
use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Health status for a single buffer.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BufferHealth {
    /// Name of the buffer (e.g., "snapshot_buffer").
    pub name: String,
    /// Configured capacity of the buffer in bytes.
    pub capacity_bytes: usize,
    /// Current usage of the buffer in bytes.
    pub current_bytes: usize,
    /// Current fill percentage. Can exceed 100 for demand figures.
    pub fill_percent: f64,
    /// Whether larger fill percentages are considered healthy.
    pub larger_is_better: bool,
    /// Health status: "ok", "warn", or "critical".
    pub status: String,
}

/// Health response containing status for all buffers.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub buffers: Vec<BufferHealth>,
    /// Worst status among all buffers.
    pub overall_status: String,
}

/// Thread-safe state for tracking buffer health.
///
/// Uses atomic operations for efficient cross-thread updates.
pub struct HealthState {
    snapshot_bytes: Arc<AtomicUsize>,
    report_demand_bytes: Arc<AtomicUsize>,
    config: Arc<AppConfig>,
}

impl HealthState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            snapshot_bytes: Arc::new(AtomicUsize::new(0)),
            report_demand_bytes: Arc::new(AtomicUsize::new(0)),
            config: Arc::new(config),
        }
    }

    /// Updates the number of bytes published by the last scan.
    pub fn update_snapshot_bytes(&self, value: usize) {
        self.snapshot_bytes.store(value, Ordering::Relaxed);
    }

    /// Updates the unclipped size of the last report.
    pub fn update_report_demand_bytes(&self, value: usize) {
        self.report_demand_bytes.store(value, Ordering::Relaxed);
    }

    pub fn get_snapshot_bytes(&self) -> usize {
        self.snapshot_bytes.load(Ordering::Relaxed)
    }

    pub fn get_report_demand_bytes(&self) -> usize {
        self.report_demand_bytes.load(Ordering::Relaxed)
    }

    /// Returns the current health status for all buffers.
    pub fn get_health(&self) -> HealthResponse {
        let buffers = vec![
            compute_buffer_health(
                "snapshot_buffer",
                self.get_snapshot_bytes(),
                &self.config.snapshot_buffer,
            ),
            compute_buffer_health(
                "report_demand",
                self.get_report_demand_bytes(),
                &self.config.report_demand,
            ),
        ];

        let overall_status = buffers
            .iter()
            .map(|b| status_priority(&b.status))
            .max()
            .map(priority_to_status)
            .unwrap_or_else(|| "ok".to_string());

        HealthResponse {
            buffers,
            overall_status,
        }
    }
}

fn compute_buffer_health(
    name: &str,
    current_bytes: usize,
    config: &BufferHealthConfig,
) -> BufferHealth {
    let capacity = config.capacity_bytes.max(1); // Avoid division by zero
    let fill_percent = (current_bytes as f64) / (capacity as f64) * 100.0;

    let status = evaluate_status(
        fill_percent,
        config.larger_is_better,
        config.warn_percent,
        config.critical_percent,
    );

    BufferHealth {
        name: name.to_string(),
        capacity_bytes: config.capacity_bytes,
        current_bytes,
        fill_percent,
        larger_is_better: config.larger_is_better,
        status,
    }
}

/// Evaluates the health status based on fill percentage and thresholds.
///
/// For `larger_is_better == false` higher fill is worse; for `true` lower
/// fill is worse. Thresholds are exclusive.
fn evaluate_status(
    fill_percent: f64,
    larger_is_better: bool,
    warn_percent: Option<f64>,
    critical_percent: Option<f64>,
) -> String {
    let crosses = |threshold: f64| {
        if larger_is_better {
            fill_percent < threshold
        } else {
            fill_percent > threshold
        }
    };

    if critical_percent.is_some_and(crosses) {
        return "critical".to_string();
    }
    if warn_percent.is_some_and(crosses) {
        return "warn".to_string();
    }
    "ok".to_string()
}

/// Returns a numeric priority for status (higher = worse).
fn status_priority(status: &str) -> u8 {
    match status {
        "warn" => 1,
        "critical" => 2,
        _ => 0,
    }
}

fn priority_to_status(priority: u8) -> String {
    match priority {
        1 => "warn".to_string(),
        2 => "critical".to_string(),
        _ => "ok".to_string(),
    }
}
