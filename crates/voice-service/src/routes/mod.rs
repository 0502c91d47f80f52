//! HTTP routes and shared application state.

use crate::config::Config;
use crate::handlers;
use crate::middleware::http_metrics_middleware;
use crate::services::token_service::TokenIssuer;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

/// Per-request timeout.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// State shared by all handlers. Immutable once the listener binds.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Configuration after start-up provisioning.
    pub config: Config,

    pub token_issuer: TokenIssuer,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let token_issuer = TokenIssuer::new(config.token_ttl_seconds);
        Self {
            config,
            token_issuer,
        }
    }
}

/// Build the application router.
///
/// - `GET /ping` - liveness
/// - `GET /ncco` - inbound-call webhook
/// - `POST /voiceEvent` - call-event webhook
/// - `POST /tokens/:username` - user capability token
/// - `GET /metrics` - Prometheus scrape
///
/// Layer order, outermost first: HTTP metrics, timeout, trace.
pub fn build_routes(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let webhook_routes = Router::new()
        .route("/ping", get(handlers::ping))
        .route("/ncco", get(handlers::answer_call))
        .route("/voiceEvent", post(handlers::voice_event))
        .route("/tokens/:username", post(handlers::create_user_token))
        .with_state(state);

    let metrics_routes = Router::new()
        .route("/metrics", get(handlers::metrics_handler))
        .with_state(metrics_handle);

    webhook_routes
        .merge(metrics_routes)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(middleware::from_fn(http_metrics_middleware))
}
