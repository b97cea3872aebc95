//! Parsed view of the latest report.

use axum::{extract::State, response::IntoResponse, Json};
use chrome_info_exporter::parse_report;
use tracing::{debug, instrument};

use crate::state::SharedState;

/// Handler for the /processes endpoint.
#[instrument(skip(state))]
pub async fn processes_handler(State(state): State<SharedState>) -> impl IntoResponse {
    state.health_stats.record_http_request();

    let bytes = state.snapshot.read_stable();
    let processes = parse_report(&String::from_utf8_lossy(&bytes));
    debug!(
        "Parsed {} records from snapshot generation {}",
        processes.len(),
        state.snapshot.generation()
    );

    Json(processes)
}
