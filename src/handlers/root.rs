//! Root endpoint handler listing the available endpoints.

use axum::{extract::State, response::IntoResponse};
use tracing::{debug, instrument};

use crate::handlers::health::FOOTER_TEXT;
use crate::state::SharedState;

/// Handler for the root `/` endpoint.
#[instrument(skip(state))]
pub async fn root_handler(State(state): State<SharedState>) -> impl IntoResponse {
    debug!("Processing / request");
    state.health_stats.record_http_request();

    let version = env!("CARGO_PKG_VERSION");
    let built = env!("VERGEN_BUILD_TIMESTAMP");

    let uptime_secs = state.start_time.elapsed().as_secs();
    let hours = uptime_secs / 3600;
    let minutes = (uptime_secs % 3600) / 60;
    let seconds = uptime_secs % 60;

    let mut endpoints = vec![
        ("/chrome_info", "Latest report as plain text (?offset=N&count=M)"),
        ("/processes", "Latest report parsed into JSON records"),
    ];
    if state.config.enable_metrics.unwrap_or(true) {
        endpoints.push(("/metrics", "Prometheus metrics for the scan loop"));
    }
    if state.config.enable_health.unwrap_or(true) {
        endpoints.push(("/health", "Scan statistics and snapshot buffer health"));
    }

    let mut body = format!(
        "Chrome Info Exporter {version}\nBuilt: {built}\nUptime: {hours}h {minutes}m {seconds}s\n\nEndpoints:\n"
    );
    for (path, desc) in endpoints {
        body.push_str(&format!("  {:<14} {}\n", path, desc));
    }
    body.push('\n');
    body.push_str(FOOTER_TEXT);
    body.push('\n');

    ([("Content-Type", "text/plain; charset=utf-8")], body)
}
