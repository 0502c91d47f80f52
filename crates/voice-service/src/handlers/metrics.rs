//! Prometheus scrape endpoint.
//!
//! Unauthenticated. Labels are bounded and carry no phone numbers,
//! usernames or tokens.

use axum::{extract::State, response::IntoResponse};
use metrics_exporter_prometheus::PrometheusHandle;

/// `GET /metrics`
#[tracing::instrument(skip_all, name = "voice.metrics.scrape")]
pub async fn metrics_handler(State(handle): State<PrometheusHandle>) -> impl IntoResponse {
    handle.render()
}
