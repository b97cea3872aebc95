//! Health check endpoint handler.
//!
//! This module provides the `/health` endpoint handler that returns
//! scan statistics and snapshot buffer status.

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use chrome_info_exporter::HealthResponse;
use std::fmt::Write as FmtWrite;
use tracing::{debug, instrument};

use crate::state::SharedState;

// Time conversion constants
const SECONDS_PER_HOUR: f64 = 3600.0;
const MINUTES_PER_HOUR: f64 = 60.0;
const HOURS_PER_DAY: f64 = 24.0;

/// Footer text for human-readable HTTP endpoints.
pub const FOOTER_TEXT: &str = "chrome-info-exporter: Chrome process memory report";

/// Handler for the /health endpoint.
#[instrument(skip(state))]
pub async fn health_handler(State(state): State<SharedState>) -> impl IntoResponse {
    debug!("Processing /health request");
    state.health_stats.record_http_request();

    // Nothing is published until the first scan completes
    let (status, message) = if state.health_stats.has_scanned() {
        (StatusCode::OK, "OK")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "Waiting for first scan")
    };

    let uptime_seconds = state.health_stats.get_uptime_seconds();
    let uptime_hours = uptime_seconds as f64 / SECONDS_PER_HOUR;
    let uptime_str = if uptime_hours < 1.0 {
        format!("{:.1} minutes", uptime_hours * MINUTES_PER_HOUR)
    } else if uptime_hours < HOURS_PER_DAY {
        format!("{:.1} hours", uptime_hours)
    } else {
        format!("{:.1} days", uptime_hours / HOURS_PER_DAY)
    };

    let table = state.health_stats.render_table();
    let buffer_section = render_buffer_health(&state.health_state.get_health());

    debug!("Health check: {} - {}", status, message);
    (
        status,
        [("Content-Type", "text/plain; charset=utf-8")],
        format!(
            "{message}\n\nUptime: {uptime_str}\nSnapshot generation: {}\n\n{table}\n{buffer_section}\n{FOOTER_TEXT}",
            state.snapshot.generation()
        ),
    )
}

/// Renders buffer health information as a plain-text table.
pub fn render_buffer_health(health: &HealthResponse) -> String {
    let mut out = String::new();
    writeln!(out, "BUFFER HEALTH").ok();
    writeln!(out, "=============").ok();
    writeln!(out).ok();
    writeln!(
        out,
        "{:16} | {:>12} | {:>15} | {:>7} | {:>8}",
        "Buffer", "Usage (B)", "Capacity (B)", "Fill %", "Status"
    )
    .ok();
    writeln!(out, "{}", "-".repeat(70)).ok();

    for buffer in &health.buffers {
        writeln!(
            out,
            "{:16} | {:>12} | {:>15} | {:>7.1} | {:>8}",
            buffer.name,
            buffer.current_bytes,
            buffer.capacity_bytes,
            buffer.fill_percent,
            buffer.status
        )
        .ok();
    }

    writeln!(out).ok();
    writeln!(out, "Overall Buffer Status: {}", health.overall_status).ok();
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrome_info_exporter::BufferHealth;

    #[test]
    fn test_render_buffer_health_lists_every_buffer() {
        let health = HealthResponse {
            buffers: vec![BufferHealth {
                name: "snapshot_buffer".into(),
                capacity_bytes: 8192,
                current_bytes: 4096,
                fill_percent: 50.0,
                larger_is_better: false,
                status: "ok".into(),
            }],
            overall_status: "ok".into(),
        };
        let out = render_buffer_health(&health);
        assert!(out.contains("snapshot_buffer"));
        assert!(out.contains("8192"));
        assert!(out.contains("50.0"));
        assert!(out.contains("Overall Buffer Status: ok"));
    }
}
