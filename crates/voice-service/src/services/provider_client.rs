//! Outbound calls to the telephony provider's REST APIs.
//!
//! Two one-shot calls, both authenticated with HTTP Basic
//! (`api_key:api_secret`):
//!
//! - `PUT {api_url}/v2/applications/{id}` registers the answer and event
//!   webhooks.
//! - `POST {rest_url}/number/update` (form-encoded) routes a phone number to
//!   the application.
//!
//! No retries. Any transport error, timeout or non-2xx status is returned to
//! the caller.

use crate::config::ProviderAccount;
use crate::services::provisioning::ProvisioningError;
use common::secret::ExposeSecret;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, instrument, trace, warn};

/// Connection timeout for provider calls.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Path of the inbound-call webhook on this server.
pub const ANSWER_PATH: &str = "/ncco";

/// Path of the call-event webhook on this server.
pub const EVENT_PATH: &str = "/voiceEvent";

#[derive(Debug, Serialize)]
struct ApplicationUpdate<'a> {
    name: &'a str,
    capabilities: Capabilities,
}

#[derive(Debug, Serialize)]
struct Capabilities {
    voice: VoiceCapability,
}

#[derive(Debug, Serialize)]
struct VoiceCapability {
    webhooks: VoiceWebhooks,
}

#[derive(Debug, Serialize)]
struct VoiceWebhooks {
    answer_url: Webhook,
    event_url: Webhook,
}

#[derive(Debug, Serialize)]
struct Webhook {
    address: String,
    http_method: &'static str,
}

/// Client for the provider's application and number APIs.
#[derive(Debug, Clone)]
pub struct ProviderClient {
    http: reqwest::Client,
    api_url: String,
    rest_url: String,
    account: ProviderAccount,
}

impl ProviderClient {
    /// # Errors
    ///
    /// `ProvisioningError::Configuration` if the HTTP client cannot be built.
    pub fn new(
        api_url: &str,
        rest_url: &str,
        account: ProviderAccount,
        timeout: Duration,
    ) -> Result<Self, ProvisioningError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(CONNECT_TIMEOUT.min(timeout))
            .build()
            .map_err(|e| {
                ProvisioningError::Configuration(format!("Failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
            rest_url: rest_url.trim_end_matches('/').to_string(),
            account,
        })
    }

    /// Point the application's answer (GET) and event (POST) webhooks at
    /// `public_url`.
    #[instrument(skip_all, fields(application_id = %application_id))]
    pub async fn register_webhooks(
        &self,
        application_id: &str,
        application_name: &str,
        public_url: &str,
    ) -> Result<(), ProvisioningError> {
        let url = format!("{}/v2/applications/{}", self.api_url, application_id);
        let base = public_url.trim_end_matches('/');

        let body = ApplicationUpdate {
            name: application_name,
            capabilities: Capabilities {
                voice: VoiceCapability {
                    webhooks: VoiceWebhooks {
                        answer_url: Webhook {
                            address: format!("{base}{ANSWER_PATH}"),
                            http_method: "GET",
                        },
                        event_url: Webhook {
                            address: format!("{base}{EVENT_PATH}"),
                            http_method: "POST",
                        },
                    },
                },
            },
        };

        debug!(target: "voice.provider", url = %url, "Registering webhooks with provider");

        let response = self
            .http
            .put(&url)
            .basic_auth(&self.account.api_key, Some(self.account.api_secret.expose_secret()))
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        check_status(response, "register_webhooks").await
    }

    /// Route inbound calls for `msisdn` to the application.
    #[instrument(skip_all, fields(country = %country))]
    pub async fn bind_number(
        &self,
        country: &str,
        msisdn: &str,
        application_id: &str,
    ) -> Result<(), ProvisioningError> {
        let url = format!("{}/number/update", self.rest_url);
        let form = [
            ("country", country),
            ("msisdn", msisdn),
            ("app_id", application_id),
        ];

        debug!(target: "voice.provider", url = %url, "Binding phone number to application");

        let response = self
            .http
            .post(&url)
            .basic_auth(&self.account.api_key, Some(self.account.api_secret.expose_secret()))
            .form(&form)
            .send()
            .await
            .map_err(transport_error)?;

        check_status(response, "bind_number").await
    }
}

pub(crate) fn transport_error(e: reqwest::Error) -> ProvisioningError {
    debug!(target: "voice.provider", error = %e, "HTTP request failed");
    if e.is_timeout() {
        ProvisioningError::Timeout
    } else {
        ProvisioningError::Http(e.to_string())
    }
}

pub(crate) async fn check_status(
    response: reqwest::Response,
    operation: &'static str,
) -> Result<(), ProvisioningError> {
    let status = response.status();
    if status.is_success() {
        debug!(target: "voice.provider", operation, status = %status, "Provider call succeeded");
        return Ok(());
    }

    // Body only at trace level; provider errors can echo credentials back.
    let body = response.text().await.unwrap_or_else(|e| {
        trace!(target: "voice.provider", error = %e, "Failed to read error response body");
        "<failed to read body>".to_string()
    });
    warn!(target: "voice.provider", operation, status = %status, "Provider rejected request");
    trace!(target: "voice.provider", operation, body = %body, "Provider rejection body");

    Err(ProvisioningError::UnexpectedStatus {
        status: status.as_u16(),
    })
}
