//! Status endpoint serving the raw report.
//!
//! `GET /chrome_info?offset=N&count=M` copies at most `count` bytes of the
//! published report starting at `offset`. Reads never wait on a running scan;
//! a read that overlaps a publish may mix two reports, which callers accept.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::state::SharedState;

/// Query parameters for a bounded read.
#[derive(Debug, Default, Deserialize)]
pub struct ReadQuery {
    pub offset: Option<usize>,
    pub count: Option<usize>,
}

/// Handler for the /chrome_info endpoint.
#[instrument(skip(state))]
pub async fn chrome_info_handler(
    State(state): State<SharedState>,
    Query(query): Query<ReadQuery>,
) -> impl IntoResponse {
    state.health_stats.record_http_request();
    state.health_stats.record_status_endpoint_call();

    let offset = query.offset.unwrap_or(0);
    let count = query
        .count
        .unwrap_or(state.snapshot.capacity())
        .min(state.snapshot.capacity());

    let mut buf = vec![0u8; count];
    let copied = state.snapshot.read_at(offset, &mut buf);
    buf.truncate(copied);
    debug!("Served {} report bytes from offset {}", copied, offset);

    (
        StatusCode::OK,
        [("Content-Type", "text/plain; charset=utf-8")],
        buf,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::state::{AppState, TableSource};
    use axum::body::to_bytes;
    use axum::http::header::CONTENT_TYPE;
    use chrome_info_exporter::{FixtureProcess, FixtureTable};

    const EXPECTED_REPORT: &str = "Scanning Chrome processes...\n\
        Found Chrome process: PID: 4321, Name: chrome, RSS: 10240, virt_mem: 0\n";

    fn scanned_state() -> SharedState {
        let state = AppState::new(Config::default()).expect("state");
        let table = FixtureTable::new(
            4096,
            vec![
                FixtureProcess::with_memory(4321, "chrome", 2560, 100),
                FixtureProcess::with_memory(4322, "bash", 10, 10),
            ],
        );
        state
            .run_scan(&TableSource::Fixture(table))
            .expect("scan ran");
        state
    }

    async fn get(
        state: &SharedState,
        offset: Option<usize>,
        count: Option<usize>,
    ) -> (String, Vec<u8>) {
        let query = ReadQuery { offset, count };
        let response = chrome_info_handler(State(state.clone()), Query(query))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        (content_type, body.to_vec())
    }

    #[tokio::test]
    async fn test_defaults_return_whole_report_as_text() {
        let state = scanned_state();
        let (content_type, body) = get(&state, None, None).await;
        assert!(content_type.starts_with("text/plain"));
        assert_eq!(body, EXPECTED_REPORT.as_bytes());
    }

    #[tokio::test]
    async fn test_offset_and_count_select_a_window() {
        let state = scanned_state();
        let (_, body) = get(&state, Some(9), Some(6)).await;
        assert_eq!(body, b"Chrome");

        let (_, tail) = get(&state, Some(29), None).await;
        assert_eq!(tail, &EXPECTED_REPORT.as_bytes()[29..]);
    }

    #[tokio::test]
    async fn test_count_past_end_is_clipped_to_report() {
        let state = scanned_state();
        let (_, body) = get(&state, Some(10), Some(5000)).await;
        assert_eq!(body, &EXPECTED_REPORT.as_bytes()[10..]);
    }

    #[tokio::test]
    async fn test_offset_at_or_beyond_end_is_empty() {
        let state = scanned_state();
        let len = EXPECTED_REPORT.len();

        let (_, at_end) = get(&state, Some(len), Some(10)).await;
        assert!(at_end.is_empty());

        let (_, beyond) = get(&state, Some(len + 100), None).await;
        assert!(beyond.is_empty());
    }

    #[tokio::test]
    async fn test_huge_count_is_capped_at_capacity() {
        let state = scanned_state();
        let (_, body) = get(&state, Some(0), Some(usize::MAX)).await;
        assert_eq!(body, EXPECTED_REPORT.as_bytes());
        assert!(body.len() <= state.snapshot.capacity());
    }

    #[tokio::test]
    async fn test_empty_before_first_scan() {
        let state = AppState::new(Config::default()).expect("state");
        let (content_type, body) = get(&state, None, None).await;
        assert!(content_type.starts_with("text/plain"));
        assert!(body.is_empty());
        assert_eq!(
            state
                .health_stats
                .status_endpoint_calls
                .load(std::sync::atomic::Ordering::Relaxed),
            1
        );
    }
}
