//! Inbound-call webhook tests (`GET /ncco`).

use reqwest::StatusCode;
use serde_json::{json, Value};
use voice_test_utils::TestVoiceServer;

async fn get_ncco(server: &TestVoiceServer, query: &[(&str, &str)]) -> Result<Value, anyhow::Error> {
    let response = reqwest::Client::new()
        .get(format!("{}/ncco", server.url()))
        .query(query)
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    Ok(response.json().await?)
}

#[tokio::test]
async fn test_ncco_default_greeting() -> Result<(), anyhow::Error> {
    let server = TestVoiceServer::spawn().await?;

    let body = get_ncco(&server, &[("to", "123"), ("from", "45")]).await?;

    assert_eq!(
        body,
        json!([{
            "action": "talk",
            "text": "Hello There, your number is 1  2  3 and you are calling 4 5"
        }])
    );
    Ok(())
}

#[tokio::test]
async fn test_ncco_missing_parameters_default_to_unknown() -> Result<(), anyhow::Error> {
    let server = TestVoiceServer::spawn().await?;

    let body = get_ncco(&server, &[]).await?;

    assert_eq!(
        body[0]["text"],
        "Hello There, your number is u  n  k  n  o  w  n and you are calling u n k n o w n"
    );
    Ok(())
}

#[tokio::test]
async fn test_ncco_talk_override() -> Result<(), anyhow::Error> {
    let server = TestVoiceServer::spawn().await?;

    let body = get_ncco(
        &server,
        &[("to", "ncco__talk__Welcome to the test line"), ("from", "1")],
    )
    .await?;

    assert_eq!(body, json!([{"action": "talk", "text": "Welcome to the test line"}]));
    Ok(())
}

#[tokio::test]
async fn test_ncco_talk_override_without_text() -> Result<(), anyhow::Error> {
    let server = TestVoiceServer::spawn().await?;

    let body = get_ncco(&server, &[("to", "ncco__talk")]).await?;

    assert_eq!(body, json!([{"action": "talk", "text": ""}]));
    Ok(())
}

#[tokio::test]
async fn test_ncco_dtmf_does_not_change_document() -> Result<(), anyhow::Error> {
    let server = TestVoiceServer::spawn().await?;

    let without = get_ncco(&server, &[("to", "1"), ("from", "2")]).await?;
    let with = get_ncco(&server, &[("to", "1"), ("from", "2"), ("dtmf", "9")]).await?;

    assert_eq!(without, with);
    Ok(())
}

#[tokio::test]
async fn test_ncco_repeated_parameter_uses_first_value() -> Result<(), anyhow::Error> {
    let server = TestVoiceServer::spawn().await?;

    let body = get_ncco(&server, &[("to", "1"), ("to", "2"), ("from", "3")]).await?;

    assert_eq!(
        body,
        json!([{
            "action": "talk",
            "text": "Hello There, your number is 1 and you are calling 3"
        }])
    );
    Ok(())
}
