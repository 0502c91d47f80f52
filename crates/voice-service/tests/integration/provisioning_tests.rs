//! Development-mode start-up provisioning against mocked provider and
//! tunnel agent APIs.

use serde_json::json;
use std::time::Duration;
use voice_service::config::Config;
use voice_service::services::provisioning::{
    run_startup, ProvisioningError, ProvisioningStep, StartupError,
};
use voice_service::services::tunnel::NgrokTunnel;
use voice_test_utils::{test_vars, TestVoiceServer, TEST_APPLICATION_ID};
use wiremock::matchers::{body_json, body_string_contains, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PUBLIC_URL: &str = "https://f00d.ngrok.io";

fn dev_config(provider: &MockServer, phone_number: Option<&str>) -> Result<Config, anyhow::Error> {
    let mut vars = test_vars();
    vars.remove("APP_ENV");
    vars.insert("MY_NEXMO_APP_API_KEY".to_string(), "key-abc".to_string());
    vars.insert("MY_NEXMO_APP_API_SECRET".to_string(), "secret-xyz".to_string());
    vars.insert("NEXMO_API_URL".to_string(), provider.uri());
    vars.insert("NEXMO_REST_URL".to_string(), provider.uri());
    vars.insert("PROVISIONING_TIMEOUT_SECONDS".to_string(), "2".to_string());
    if let Some(number) = phone_number {
        vars.insert("MY_NEXMO_APP_PHONE_NUMBER".to_string(), number.to_string());
    }
    Config::from_vars(&vars).map_err(|e| anyhow::anyhow!("Failed to create config: {}", e))
}

async fn mount_tunnel_agent(agent: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/tunnels/voice-webhooks"))
        .respond_with(ResponseTemplate::new(404))
        .mount(agent)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/tunnels"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "name": "voice-webhooks",
            "public_url": PUBLIC_URL,
            "proto": "https"
        })))
        .expect(1)
        .mount(agent)
        .await;
}

/// Full sequence: number bound, tunnel opened, webhooks registered with the
/// tunnel URL, and the served config carries the public URL.
#[tokio::test]
async fn test_startup_provisions_and_serves() -> Result<(), anyhow::Error> {
    let provider = MockServer::start().await;
    let agent = MockServer::start().await;
    mount_tunnel_agent(&agent).await;

    Mock::given(method("POST"))
        .and(path("/number/update"))
        .and(header_exists("authorization"))
        .and(body_string_contains("msisdn=14155550100"))
        .and(body_string_contains(format!("app_id={TEST_APPLICATION_ID}")))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&provider)
        .await;

    Mock::given(method("PUT"))
        .and(path(format!("/v2/applications/{TEST_APPLICATION_ID}")))
        .and(body_json(json!({
            "name": "ivr-state-test",
            "capabilities": {"voice": {"webhooks": {
                "answer_url": {"address": format!("{PUBLIC_URL}/ncco"), "http_method": "GET"},
                "event_url": {"address": format!("{PUBLIC_URL}/voiceEvent"), "http_method": "POST"}
            }}}
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&provider)
        .await;

    let tunnel = NgrokTunnel::new(&agent.uri(), Duration::from_secs(2))?;
    let config = run_startup(dev_config(&provider, Some("14155550100"))?, &tunnel).await?;
    assert_eq!(config.server_url, PUBLIC_URL);

    let server = TestVoiceServer::spawn_with_config(config).await?;
    assert_eq!(server.config().server_url, PUBLIC_URL);

    let response = reqwest::get(format!("{}/ping", server.url())).await?;
    assert_eq!(response.status(), 200);

    Ok(())
}

/// A rejected registration names the step; the tunnel was still opened
/// because it precedes registration.
#[tokio::test]
async fn test_startup_registration_rejected() -> Result<(), anyhow::Error> {
    let provider = MockServer::start().await;
    let agent = MockServer::start().await;
    mount_tunnel_agent(&agent).await;

    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&provider)
        .await;

    let tunnel = NgrokTunnel::new(&agent.uri(), Duration::from_secs(2))?;
    let result = run_startup(dev_config(&provider, None)?, &tunnel).await;

    assert!(matches!(
        result,
        Err(StartupError::Step {
            step: ProvisioningStep::RegisterWebhooks,
            source: ProvisioningError::UnexpectedStatus { status: 403 },
        })
    ));

    Ok(())
}

/// A slow provider hits the provisioning timeout.
#[tokio::test]
async fn test_startup_bind_number_timeout() -> Result<(), anyhow::Error> {
    let provider = MockServer::start().await;
    let agent = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/number/update"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&provider)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/tunnels"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&agent)
        .await;

    let tunnel = NgrokTunnel::new(&agent.uri(), Duration::from_secs(2))?;
    let result = run_startup(dev_config(&provider, Some("14155550100"))?, &tunnel).await;

    assert!(matches!(
        result,
        Err(StartupError::Step {
            step: ProvisioningStep::BindNumber,
            source: ProvisioningError::Timeout,
        })
    ));

    Ok(())
}
