//! Metrics definitions for the voice webhook server.
//!
//! All metrics follow Prometheus naming conventions:
//! - `voice_` prefix
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Cardinality
//!
//! Labels are bounded:
//! - `method`: HTTP methods
//! - `endpoint`: the route table, dynamic segments replaced, `/other` for the rest
//! - `status`: success, error, timeout
//! - `token_type`: user, backend
//! - `instruction`: greeting, explicit_talk
//! - `step`: bind_number, open_tunnel, register_webhooks

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Install the Prometheus recorder and return the handle that renders
/// `/metrics`.
///
/// Must be called before any metrics are recorded.
///
/// # Errors
///
/// Returns error if the recorder fails to install (e.g., already installed).
pub fn init_metrics_recorder() -> Result<PrometheusHandle, String> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Prefix("voice_http_request".to_string()),
            &[
                0.001, 0.005, 0.010, 0.025, 0.050, 0.100, 0.200, 0.500, 1.000, 2.000,
            ],
        )
        .map_err(|e| format!("Failed to set HTTP request buckets: {e}"))?
        // RSA signing dominates issuance time
        .set_buckets_for_metric(
            Matcher::Prefix("voice_token_issuance".to_string()),
            &[0.0005, 0.001, 0.002, 0.005, 0.010, 0.025, 0.050, 0.100],
        )
        .map_err(|e| format!("Failed to set token issuance buckets: {e}"))?
        .set_buckets_for_metric(
            Matcher::Prefix("voice_provisioning_step".to_string()),
            &[0.050, 0.100, 0.250, 0.500, 1.000, 2.500, 5.000, 10.000],
        )
        .map_err(|e| format!("Failed to set provisioning buckets: {e}"))?
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {e}"))
}

// ============================================================================
// HTTP Request Metrics
// ============================================================================

/// Record HTTP request completion
///
/// Metric: `voice_http_requests_total`, `voice_http_request_duration_seconds`
/// Labels: `method`, `endpoint`, `status`
///
/// Captures framework-level rejections (404, 405, 400 from extractors) too.
pub fn record_http_request(method: &str, endpoint: &str, status_code: u16, duration: Duration) {
    let normalized_endpoint = normalize_endpoint(endpoint);
    let status = categorize_status_code(status_code);

    histogram!("voice_http_request_duration_seconds",
        "method" => method.to_string(),
        "endpoint" => normalized_endpoint.clone(),
        "status" => status.to_string()
    )
    .record(duration.as_secs_f64());

    counter!("voice_http_requests_total",
        "method" => method.to_string(),
        "endpoint" => normalized_endpoint,
        "status_code" => status_code.to_string()
    )
    .increment(1);
}

fn categorize_status_code(status_code: u16) -> &'static str {
    match status_code {
        200..=299 => "success",
        408 | 504 => "timeout",
        _ => "error",
    }
}

/// Replace dynamic segments so the endpoint label stays bounded.
fn normalize_endpoint(path: &str) -> String {
    match path {
        "/ping" | "/ncco" | "/voiceEvent" | "/metrics" => path.to_string(),
        _ => {
            let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();
            match segments.as_slice() {
                ["tokens", username] if !username.is_empty() => "/tokens/{username}".to_string(),
                _ => "/other".to_string(),
            }
        }
    }
}

// ============================================================================
// Domain Metrics
// ============================================================================

/// Record a capability token issuance attempt.
///
/// Metric: `voice_token_issuance_duration_seconds`, `voice_token_issuance_total`
/// Labels: `token_type`, `status`
pub fn record_token_issuance(token_type: &str, status: &str, duration: Duration) {
    histogram!("voice_token_issuance_duration_seconds",
        "token_type" => token_type.to_string()
    )
    .record(duration.as_secs_f64());

    counter!("voice_token_issuance_total",
        "token_type" => token_type.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record a synthesized call-control document.
///
/// Metric: `voice_ncco_synthesized_total`
/// Labels: `instruction`
pub fn record_ncco_synthesized(instruction: &str) {
    counter!("voice_ncco_synthesized_total",
        "instruction" => instruction.to_string()
    )
    .increment(1);
}

/// Record the outcome of one start-up provisioning step.
///
/// Metric: `voice_provisioning_step_duration_seconds`, `voice_provisioning_steps_total`
/// Labels: `step`, `status`
pub fn record_provisioning_step(step: &str, status: &str, duration: Duration) {
    histogram!("voice_provisioning_step_duration_seconds",
        "step" => step.to_string()
    )
    .record(duration.as_secs_f64());

    counter!("voice_provisioning_steps_total",
        "step" => step.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}
