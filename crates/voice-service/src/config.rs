use base64::{engine::general_purpose, Engine as _};
use common::secret::SecretString;
use std::collections::HashMap;
use std::env;
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;

/// Default listener address (port 5000, all interfaces).
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:5000";

/// Display name registered with the provider when none is configured.
pub const DEFAULT_APPLICATION_NAME: &str = "ivr-state-test";

/// Country code sent with the number binding request.
pub const DEFAULT_PHONE_COUNTRY: &str = "US";

/// Default capability token validity window (1 hour).
#[allow(clippy::cast_possible_wrap)]
pub const DEFAULT_TOKEN_TTL_SECONDS: i64 = common::jwt::DEFAULT_TOKEN_TTL.as_secs() as i64;

/// Longest validity window the provider accepts (24 hours).
pub const MAX_TOKEN_TTL_SECONDS: i64 = 86_400;

/// Provider application API base URL.
pub const DEFAULT_PROVIDER_API_URL: &str = "https://api.nexmo.com";

/// Provider number-management API base URL.
pub const DEFAULT_PROVIDER_REST_URL: &str = "https://rest.nexmo.com";

/// Local ngrok agent API.
pub const DEFAULT_TUNNEL_AGENT_URL: &str = "http://127.0.0.1:4040";

/// Timeout applied to each outbound provisioning call.
pub const DEFAULT_PROVISIONING_TIMEOUT_SECONDS: u64 = 10;

pub const ENV_PRIVATE_KEY: &str = "MY_NEXMO_APP_PRIVATE_KEY";
pub const ENV_APPLICATION_ID: &str = "MY_NEXMO_APP_APPLICATION_ID";
pub const ENV_APPLICATION_NAME: &str = "MY_NEXMO_APP_APPLICATION_NAME";
pub const ENV_PHONE_NUMBER: &str = "MY_NEXMO_APP_PHONE_NUMBER";
pub const ENV_PHONE_COUNTRY: &str = "MY_NEXMO_APP_PHONE_COUNTRY";
pub const ENV_API_KEY: &str = "MY_NEXMO_APP_API_KEY";
pub const ENV_API_SECRET: &str = "MY_NEXMO_APP_API_SECRET";

/// Deployment environment.
///
/// Development mode is the default (no `APP_ENV` set) and enables the
/// start-up provisioning sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    fn from_value(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None | Some("") | Some("development") | Some("dev") => Environment::Development,
            Some(_) => Environment::Production,
        }
    }

    pub fn is_development(self) -> bool {
        self == Environment::Development
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    /// `json` selects JSON output; anything else is plain text.
    pub fn from_value(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Text,
        }
    }
}

/// Provider API credentials, only loaded in development mode.
#[derive(Debug, Clone)]
pub struct ProviderAccount {
    pub api_key: String,
    pub api_secret: SecretString,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: Environment,
    pub bind_address: String,
    pub port: u16,
    pub application_id: String,
    pub application_name: String,
    /// PEM-encoded RSA private key. Parsed at issuance time, not here.
    pub private_key: SecretString,
    pub phone_number: Option<String>,
    pub phone_country: String,
    /// Public base URL of this server. Rewritten once by tunnel setup.
    pub server_url: String,
    pub provider_account: Option<ProviderAccount>,
    pub token_ttl_seconds: i64,
    pub provider_api_url: String,
    pub provider_rest_url: String,
    pub tunnel_agent_url: String,
    pub provisioning_timeout: Duration,
    pub log_format: LogFormat,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variables: {}", .0.join(", "))]
    MissingEnvVars(Vec<String>),

    #[error("Invalid value for {name}: {reason}")]
    InvalidValue { name: String, reason: String },
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing)
    ///
    /// Every missing required variable is collected before failing, so the
    /// error lists all of them at once.
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let environment = Environment::from_value(vars.get("APP_ENV").map(String::as_str));

        let mut missing = Vec::new();
        let mut required = |name: &str| -> Option<String> {
            let value = non_empty(vars, name);
            if value.is_none() {
                missing.push(name.to_string());
            }
            value
        };

        let raw_private_key = required(ENV_PRIVATE_KEY);
        let application_id = required(ENV_APPLICATION_ID);
        let (api_key, api_secret) = if environment.is_development() {
            (required(ENV_API_KEY), required(ENV_API_SECRET))
        } else {
            (None, None)
        };

        let (Some(raw_private_key), Some(application_id)) = (raw_private_key, application_id)
        else {
            return Err(ConfigError::MissingEnvVars(missing));
        };
        if !missing.is_empty() {
            return Err(ConfigError::MissingEnvVars(missing));
        }

        let provider_account = match (api_key, api_secret) {
            (Some(api_key), Some(api_secret)) => Some(ProviderAccount {
                api_key,
                api_secret: SecretString::from(api_secret),
            }),
            _ => None,
        };

        let private_key = SecretString::from(normalize_private_key(&raw_private_key)?);

        let bind_address =
            non_empty(vars, "BIND_ADDRESS").unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());
        let port = bind_address
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue {
                name: "BIND_ADDRESS".to_string(),
                reason: e.to_string(),
            })?
            .port();

        let token_ttl_seconds = match non_empty(vars, "TOKEN_TTL_SECONDS") {
            Some(raw) => {
                let ttl = raw.parse::<i64>().map_err(|e| ConfigError::InvalidValue {
                    name: "TOKEN_TTL_SECONDS".to_string(),
                    reason: e.to_string(),
                })?;
                if !(1..=MAX_TOKEN_TTL_SECONDS).contains(&ttl) {
                    return Err(ConfigError::InvalidValue {
                        name: "TOKEN_TTL_SECONDS".to_string(),
                        reason: format!("must be between 1 and {MAX_TOKEN_TTL_SECONDS}, got {ttl}"),
                    });
                }
                ttl
            }
            None => DEFAULT_TOKEN_TTL_SECONDS,
        };

        let provisioning_timeout = match non_empty(vars, "PROVISIONING_TIMEOUT_SECONDS") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                Ok(_) => {
                    return Err(ConfigError::InvalidValue {
                        name: "PROVISIONING_TIMEOUT_SECONDS".to_string(),
                        reason: "must be greater than zero".to_string(),
                    })
                }
                Err(e) => {
                    return Err(ConfigError::InvalidValue {
                        name: "PROVISIONING_TIMEOUT_SECONDS".to_string(),
                        reason: e.to_string(),
                    })
                }
            },
            None => Duration::from_secs(DEFAULT_PROVISIONING_TIMEOUT_SECONDS),
        };

        let log_format = LogFormat::from_value(vars.get("LOG_FORMAT").map(String::as_str));

        Ok(Config {
            environment,
            bind_address,
            port,
            application_id,
            application_name: non_empty(vars, ENV_APPLICATION_NAME)
                .unwrap_or_else(|| DEFAULT_APPLICATION_NAME.to_string()),
            private_key,
            phone_number: non_empty(vars, ENV_PHONE_NUMBER),
            phone_country: non_empty(vars, ENV_PHONE_COUNTRY)
                .unwrap_or_else(|| DEFAULT_PHONE_COUNTRY.to_string()),
            server_url: format!("http://localhost:{port}"),
            provider_account,
            token_ttl_seconds,
            provider_api_url: non_empty(vars, "NEXMO_API_URL")
                .unwrap_or_else(|| DEFAULT_PROVIDER_API_URL.to_string()),
            provider_rest_url: non_empty(vars, "NEXMO_REST_URL")
                .unwrap_or_else(|| DEFAULT_PROVIDER_REST_URL.to_string()),
            tunnel_agent_url: non_empty(vars, "NGROK_AGENT_URL")
                .unwrap_or_else(|| DEFAULT_TUNNEL_AGENT_URL.to_string()),
            provisioning_timeout,
            log_format,
        })
    }
}

fn non_empty(vars: &HashMap<String, String>, name: &str) -> Option<String> {
    vars.get(name)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
}

/// Accept the private key either as PEM (with real or `\n`-escaped newlines,
/// as `.env` files usually carry it) or as base64-encoded PEM.
fn normalize_private_key(raw: &str) -> Result<String, ConfigError> {
    if raw.contains("-----BEGIN") {
        return Ok(raw.replace("\\n", "\n"));
    }

    let invalid = |reason: String| ConfigError::InvalidValue {
        name: ENV_PRIVATE_KEY.to_string(),
        reason,
    };

    let decoded = general_purpose::STANDARD
        .decode(raw)
        .map_err(|e| invalid(format!("neither PEM nor base64: {e}")))?;
    let pem = String::from_utf8(decoded).map_err(|_| invalid("decoded key is not UTF-8".into()))?;

    if !pem.contains("-----BEGIN") {
        return Err(invalid("decoded key is not PEM".into()));
    }
    Ok(pem)
}
