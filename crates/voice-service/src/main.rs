//! Voice webhook server
//!
//! Loads configuration, provisions webhooks in development mode, then serves
//! the webhook and token endpoints.

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};
use voice_service::config::{Config, LogFormat};
use voice_service::observability::{self, metrics::init_metrics_recorder};
use voice_service::routes::{self, AppState};
use voice_service::services::provisioning;
use voice_service::services::token_service;
use voice_service::services::tunnel::NgrokTunnel;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env file is normal outside local development.
    let dotenv = dotenvy::dotenv();
    let config = Config::from_env();

    // Falls back to text so a configuration failure is still logged.
    let log_format = config
        .as_ref()
        .map_or(LogFormat::Text, |config| config.log_format);
    observability::init_tracing(log_format)?;

    info!("Starting voice webhook server");
    if let Err(e) = dotenv {
        if !e.not_found() {
            warn!("Failed to load .env file: {}", e);
        }
    }

    let config = config.map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    info!(
        environment = ?config.environment,
        bind_address = %config.bind_address,
        application_id = %config.application_id,
        token_ttl_seconds = config.token_ttl_seconds,
        "Configuration loaded successfully"
    );

    let metrics_handle = init_metrics_recorder().map_err(|e| {
        error!("Failed to initialize metrics: {}", e);
        e
    })?;

    let tunnel = NgrokTunnel::new(&config.tunnel_agent_url, config.provisioning_timeout)?;
    let config = provisioning::run_startup(config, &tunnel).await.map_err(|e| {
        error!(step = %e.step(), "Start-up provisioning failed: {}", e);
        e
    })?;

    let state = Arc::new(AppState::new(config));

    if state.config.environment.is_development() {
        // Surfaces a broken private key before the first client asks for a token.
        match token_service::issue_backend_token(&state.token_issuer, &state.config) {
            Ok(_) => info!("Private key check passed"),
            Err(e) => warn!("Private key check failed, token requests will fail: {}", e),
        }
    }

    let addr: SocketAddr = state.config.bind_address.parse().map_err(|e| {
        error!("Invalid bind address: {}", e);
        e
    })?;
    let server_url = state.config.server_url.clone();

    let app = routes::build_routes(state, metrics_handle);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(
        server_url = %server_url,
        "Voice webhook server listening on {}", addr
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Voice webhook server shutdown complete");

    Ok(())
}

/// Resolves on SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received SIGINT, shutting down..."),
            Err(e) => error!("Failed to listen for SIGINT: {}", e),
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received SIGTERM, shutting down...");
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
