//! Metrics endpoint handler for Prometheus scraping.
//!
//! Metrics are updated by the scan job; scraping only encodes the registry.

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use prometheus::{Encoder, TextEncoder};
use tracing::{debug, error, instrument};

use crate::state::SharedState;

/// Buffer capacity for metrics encoding.
const BUFFER_CAP: usize = 16 * 1024;

/// Error type for metrics endpoint failures.
#[derive(Debug)]
pub enum MetricsError {
    EncodingFailed,
}

impl IntoResponse for MetricsError {
    fn into_response(self) -> axum::response::Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to encode metrics",
        )
            .into_response()
    }
}

/// Handler for the /metrics endpoint.
#[instrument(skip(state))]
pub async fn metrics_handler(State(state): State<SharedState>) -> Result<String, MetricsError> {
    debug!("Processing /metrics request");
    state.health_stats.record_http_request();

    let mut buffer = Vec::with_capacity(BUFFER_CAP);
    let encoder = TextEncoder::new();
    if let Err(e) = encoder.encode(&state.registry.gather(), &mut buffer) {
        error!("Failed to encode metrics: {}", e);
        return Err(MetricsError::EncodingFailed);
    }

    String::from_utf8(buffer).map_err(|e| {
        error!("Metrics output is not valid UTF-8: {}", e);
        MetricsError::EncodingFailed
    })
}
