//! Public tunnel to the local listener.
//!
//! The provider must reach the webhooks from the internet, so development
//! mode opens a tunnel to the local port and registers the public URL it
//! gets back. [`NgrokTunnel`] drives a locally running ngrok agent through
//! its HTTP API; tests substitute their own [`Tunnel`].

use crate::services::provider_client::transport_error;
use crate::services::provisioning::ProvisioningError;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Name of the tunnel created on the ngrok agent.
pub const DEFAULT_TUNNEL_NAME: &str = "voice-webhooks";

/// Opens a tunnel and reports its public base URL.
#[async_trait]
pub trait Tunnel: Send + Sync {
    /// Expose local `port` publicly.
    ///
    /// Returns the public base URL (scheme and host, no trailing slash).
    async fn open(&self, port: u16) -> Result<String, ProvisioningError>;
}

#[derive(Debug, Serialize)]
struct StartTunnelRequest<'a> {
    name: &'a str,
    addr: String,
    proto: &'static str,
}

#[derive(Debug, Deserialize)]
struct TunnelDescriptor {
    public_url: String,
    #[serde(default)]
    config: Option<TunnelConfig>,
}

#[derive(Debug, Deserialize)]
struct TunnelConfig {
    addr: String,
}

impl TunnelDescriptor {
    /// True when the tunnel forwards to local `port`.
    ///
    /// The agent reports `addr` as given at creation (`5000`) or normalized
    /// (`http://localhost:5000`); only the trailing port is compared.
    fn forwards_to(&self, port: u16) -> bool {
        let Some(config) = &self.config else {
            return false;
        };
        let addr = config.addr.trim_end_matches('/');
        let tail = addr.rsplit(':').next().unwrap_or(addr);
        tail.parse::<u16>().is_ok_and(|p| p == port)
    }
}

/// Tunnel backed by the ngrok agent's local API (`/api/tunnels`).
///
/// An existing tunnel with the same name is reused when it forwards to the
/// requested port, so a restart against a still-running agent does not fail.
/// One pointing elsewhere is stopped and started again.
#[derive(Debug, Clone)]
pub struct NgrokTunnel {
    http: reqwest::Client,
    agent_url: String,
    name: String,
}

impl NgrokTunnel {
    /// # Errors
    ///
    /// `ProvisioningError::Configuration` if the HTTP client cannot be built.
    pub fn new(agent_url: &str, timeout: Duration) -> Result<Self, ProvisioningError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                ProvisioningError::Configuration(format!("Failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            http,
            agent_url: agent_url.trim_end_matches('/').to_string(),
            name: DEFAULT_TUNNEL_NAME.to_string(),
        })
    }

    fn tunnel_url(&self) -> String {
        format!("{}/api/tunnels/{}", self.agent_url, self.name)
    }

    async fn existing(&self) -> Result<Option<TunnelDescriptor>, ProvisioningError> {
        let response = self
            .http
            .get(self.tunnel_url())
            .send()
            .await
            .map_err(transport_error)?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let descriptor = response.json().await.map_err(|e| {
                    ProvisioningError::InvalidResponse(format!(
                        "Failed to parse tunnel descriptor: {e}"
                    ))
                })?;
                Ok(Some(descriptor))
            }
            status => {
                warn!(target: "voice.tunnel", status = %status, "Tunnel agent lookup failed");
                Err(ProvisioningError::UnexpectedStatus {
                    status: status.as_u16(),
                })
            }
        }
    }

    async fn stop(&self) -> Result<(), ProvisioningError> {
        let response = self
            .http
            .delete(self.tunnel_url())
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if status.is_success() || status == StatusCode::NOT_FOUND {
            return Ok(());
        }

        warn!(target: "voice.tunnel", status = %status, "Tunnel agent refused to stop tunnel");
        Err(ProvisioningError::UnexpectedStatus {
            status: status.as_u16(),
        })
    }

    async fn start(&self, port: u16) -> Result<TunnelDescriptor, ProvisioningError> {
        let url = format!("{}/api/tunnels", self.agent_url);
        let request = StartTunnelRequest {
            name: &self.name,
            addr: port.to_string(),
            proto: "http",
        };

        debug!(target: "voice.tunnel", url = %url, "Starting tunnel");

        let response = self
            .http
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            warn!(target: "voice.tunnel", status = %status, "Tunnel agent refused to start tunnel");
            return Err(ProvisioningError::UnexpectedStatus {
                status: status.as_u16(),
            });
        }

        response.json().await.map_err(|e| {
            ProvisioningError::InvalidResponse(format!("Failed to parse tunnel descriptor: {e}"))
        })
    }
}

#[async_trait]
impl Tunnel for NgrokTunnel {
    #[instrument(skip_all, fields(port = port, tunnel = %self.name))]
    async fn open(&self, port: u16) -> Result<String, ProvisioningError> {
        match self.existing().await? {
            Some(descriptor) if descriptor.forwards_to(port) => {
                let public_url = public_base_url(&descriptor)?;
                info!(target: "voice.tunnel", public_url = %public_url, "Reusing existing tunnel");
                return Ok(public_url);
            }
            Some(descriptor) => {
                warn!(
                    target: "voice.tunnel",
                    addr = ?descriptor.config.as_ref().map(|c| c.addr.as_str()),
                    "Existing tunnel forwards elsewhere, restarting it"
                );
                self.stop().await?;
            }
            None => {}
        }

        let descriptor = self.start(port).await?;
        let public_url = public_base_url(&descriptor)?;
        info!(target: "voice.tunnel", public_url = %public_url, "Tunnel started");
        Ok(public_url)
    }
}

fn public_base_url(descriptor: &TunnelDescriptor) -> Result<String, ProvisioningError> {
    let public_url = descriptor.public_url.trim_end_matches('/');
    if !(public_url.starts_with("https://") || public_url.starts_with("http://")) {
        return Err(ProvisioningError::InvalidResponse(format!(
            "Tunnel public URL is not an http(s) URL: {public_url:?}"
        )));
    }

    Ok(public_url.to_string())
}
