//! Call-event webhook tests (`POST /voiceEvent`).

use reqwest::StatusCode;
use serde_json::json;
use voice_test_utils::TestVoiceServer;

#[tokio::test]
async fn test_voice_event_echoes_body() -> Result<(), anyhow::Error> {
    let server = TestVoiceServer::spawn().await?;
    let event = json!({
        "uuid": "63f61863-4a51-4f6b-86e1-46edebcf9356",
        "status": "answered",
        "direction": "inbound",
        "timestamp": "2024-01-01T12:00:00.000Z"
    });

    let response = reqwest::Client::new()
        .post(format!("{}/voiceEvent", server.url()))
        .json(&event)
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body, json!({"body": event}));

    Ok(())
}

#[tokio::test]
async fn test_voice_event_empty_body() -> Result<(), anyhow::Error> {
    let server = TestVoiceServer::spawn().await?;

    let response = reqwest::Client::new()
        .post(format!("{}/voiceEvent", server.url()))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body, json!({"body": {}}));

    Ok(())
}

#[tokio::test]
async fn test_voice_event_invalid_json_is_bad_request() -> Result<(), anyhow::Error> {
    let server = TestVoiceServer::spawn().await?;

    let response = reqwest::Client::new()
        .post(format!("{}/voiceEvent", server.url()))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["error"]["code"], "BAD_REQUEST");

    Ok(())
}

#[tokio::test]
async fn test_voice_event_form_body_is_acknowledged() -> Result<(), anyhow::Error> {
    let server = TestVoiceServer::spawn().await?;

    let response = reqwest::Client::new()
        .post(format!("{}/voiceEvent", server.url()))
        .header("content-type", "application/x-www-form-urlencoded")
        .body("status=answered&uuid=abc")
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body, json!({"body": {}}));

    Ok(())
}

#[tokio::test]
async fn test_voice_event_rejects_get() -> Result<(), anyhow::Error> {
    let server = TestVoiceServer::spawn().await?;

    let response = reqwest::get(format!("{}/voiceEvent", server.url())).await?;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

    Ok(())
}
