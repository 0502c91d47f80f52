//! Liveness and operational endpoint tests.

use reqwest::StatusCode;
use voice_test_utils::TestVoiceServer;

/// `/ping` answers `{"success": true}`.
#[tokio::test]
async fn test_ping_returns_success() -> Result<(), anyhow::Error> {
    let server = TestVoiceServer::spawn().await?;

    let response = reqwest::get(format!("{}/ping", server.url())).await?;
    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = response.json().await?;
    assert_eq!(body, serde_json::json!({"success": true}));

    Ok(())
}

/// `/metrics` is served as Prometheus text.
#[tokio::test]
async fn test_metrics_endpoint_is_reachable() -> Result<(), anyhow::Error> {
    let server = TestVoiceServer::spawn().await?;

    let response = reqwest::get(format!("{}/metrics", server.url())).await?;
    assert_eq!(response.status(), StatusCode::OK);

    Ok(())
}

/// Unknown paths are 404.
#[tokio::test]
async fn test_unknown_route_returns_404() -> Result<(), anyhow::Error> {
    let server = TestVoiceServer::spawn().await?;

    let response = reqwest::get(format!("{}/answer", server.url())).await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    Ok(())
}
