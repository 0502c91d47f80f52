//! Test server harness for E2E testing
//!
//! Provides `TestVoiceServer` for spawning real server instances in tests.

use crate::crypto_fixtures::{TEST_APPLICATION_ID, TEST_PRIVATE_KEY_PEM};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;
use voice_service::config::Config;
use voice_service::routes::{self, AppState};

/// Environment for a production-mode server signing with the test key.
pub fn test_vars() -> HashMap<String, String> {
    HashMap::from([
        ("APP_ENV".to_string(), "production".to_string()),
        ("BIND_ADDRESS".to_string(), "127.0.0.1:0".to_string()),
        (
            "MY_NEXMO_APP_PRIVATE_KEY".to_string(),
            TEST_PRIVATE_KEY_PEM.to_string(),
        ),
        (
            "MY_NEXMO_APP_APPLICATION_ID".to_string(),
            TEST_APPLICATION_ID.to_string(),
        ),
    ])
}

/// Test harness for spawning the voice webhook server in E2E tests.
///
/// # Example
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_ping() -> Result<(), anyhow::Error> {
///     let server = TestVoiceServer::spawn().await?;
///     let response = reqwest::get(format!("{}/ping", server.url())).await?;
///     assert_eq!(response.status(), 200);
///     Ok(())
/// }
/// ```
pub struct TestVoiceServer {
    addr: SocketAddr,
    config: Config,
    _handle: JoinHandle<()>,
}

impl TestVoiceServer {
    /// Spawn with [`test_vars`].
    pub async fn spawn() -> Result<Self, anyhow::Error> {
        Self::spawn_with_vars(test_vars()).await
    }

    /// Spawn with [`test_vars`] overridden by `overrides`.
    pub async fn spawn_with_overrides(
        overrides: &[(&str, &str)],
    ) -> Result<Self, anyhow::Error> {
        let mut vars = test_vars();
        for (name, value) in overrides {
            vars.insert((*name).to_string(), (*value).to_string());
        }
        Self::spawn_with_vars(vars).await
    }

    /// Spawn with exactly `vars` as the environment.
    pub async fn spawn_with_vars(vars: HashMap<String, String>) -> Result<Self, anyhow::Error> {
        let config = Config::from_vars(&vars)
            .map_err(|e| anyhow::anyhow!("Failed to create config: {}", e))?;
        Self::spawn_with_config(config).await
    }

    /// Spawn the real router with `config`, bound to a random local port.
    ///
    /// No provisioning runs; callers wanting a provisioned config run
    /// `provisioning::run_startup` first.
    pub async fn spawn_with_config(config: Config) -> Result<Self, anyhow::Error> {
        let state = Arc::new(AppState::new(config.clone()));

        // Not installed globally, so parallel tests do not collide.
        let metrics_handle = PrometheusBuilder::new().build_recorder().handle();
        let app = routes::build_routes(state, metrics_handle);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind test server: {}", e))?;

        let addr = listener
            .local_addr()
            .map_err(|e| anyhow::anyhow!("Failed to get local address: {}", e))?;

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("Test server error: {}", e);
            }
        });

        Ok(Self {
            addr,
            config,
            _handle: handle,
        })
    }

    /// Get the base URL of the test server.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl Drop for TestVoiceServer {
    fn drop(&mut self) {
        self._handle.abort();
    }
}
