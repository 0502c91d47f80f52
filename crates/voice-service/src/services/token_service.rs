//! Capability token issuance.
//!
//! Tokens are minted fresh per call and never stored. Validity fields come
//! from an injected [`Clock`] and the token id from a [`JtiGenerator`], so
//! tests can pin both.

use crate::config::Config;
use crate::crypto;
use crate::errors::VoiceError;
use crate::observability::metrics::record_token_issuance;
use common::jwt::{Acl, CapabilityClaims};
use common::secret::{ExposeSecret, SecretString};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::instrument;

/// Source of the current Unix time in seconds.
pub trait Clock: Send + Sync {
    fn now(&self) -> i64;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

/// Source of unique token identifiers.
pub trait JtiGenerator: Send + Sync {
    fn next_jti(&self) -> String;
}

/// Random UUID v4 token identifiers.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidJtiGenerator;

impl JtiGenerator for UuidJtiGenerator {
    fn next_jti(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

/// Signs capability tokens.
///
/// Cheap to clone; shared through `AppState`.
#[derive(Clone)]
pub struct TokenIssuer {
    clock: Arc<dyn Clock>,
    jti_generator: Arc<dyn JtiGenerator>,
    ttl_seconds: i64,
}

impl fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("ttl_seconds", &self.ttl_seconds)
            .finish_non_exhaustive()
    }
}

impl TokenIssuer {
    /// Issuer using the wall clock and random UUID token ids.
    pub fn new(ttl_seconds: i64) -> Self {
        Self {
            clock: Arc::new(SystemClock),
            jti_generator: Arc::new(UuidJtiGenerator),
            ttl_seconds,
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn with_jti_generator(mut self, jti_generator: Arc<dyn JtiGenerator>) -> Self {
        self.jti_generator = jti_generator;
        self
    }

    pub fn ttl_seconds(&self) -> i64 {
        self.ttl_seconds
    }

    /// Build, sign and return a compact RS256 token.
    ///
    /// `subject` present means a user token; absent means a backend token.
    /// `acl` defaults to [`Acl::unrestricted`].
    ///
    /// # Errors
    ///
    /// `VoiceError::Crypto` when the key cannot be parsed or signing fails.
    /// `VoiceError::Internal` when the claim window would be empty.
    #[instrument(skip_all, fields(user_token = subject.is_some()))]
    pub fn issue(
        &self,
        private_key: &SecretString,
        application_id: &str,
        subject: Option<&str>,
        acl: Option<Acl>,
    ) -> Result<String, VoiceError> {
        let start = Instant::now();

        let claims = CapabilityClaims::new(
            application_id.to_string(),
            acl.unwrap_or_default(),
            subject.map(ToString::to_string),
            self.clock.now(),
            self.ttl_seconds,
            self.jti_generator.next_jti(),
        );
        let token_type = if claims.is_user_token() { "user" } else { "backend" };

        if application_id.is_empty() || !claims.has_valid_window() {
            tracing::error!(
                target: "voice.token_service",
                ttl_seconds = self.ttl_seconds,
                "Refusing to issue token with empty application id or validity window"
            );
            record_token_issuance(token_type, "error", start.elapsed());
            return Err(VoiceError::Internal);
        }

        let result = crypto::sign_jwt(&claims, private_key.expose_secret());

        match &result {
            Ok(_) => {
                tracing::info!(
                    target: "voice.token_service",
                    token_type,
                    application_id = %claims.application_id,
                    exp = claims.exp,
                    "Capability token issued"
                );
                record_token_issuance(token_type, "success", start.elapsed());
            }
            Err(e) => {
                tracing::warn!(
                    target: "voice.token_service",
                    token_type,
                    error = %e,
                    "Capability token signing failed"
                );
                record_token_issuance(token_type, "error", start.elapsed());
            }
        }

        result
    }
}

/// Token scoped to `username`, with the default wildcard ACL.
pub fn issue_user_token(
    issuer: &TokenIssuer,
    config: &Config,
    username: &str,
) -> Result<String, VoiceError> {
    issuer.issue(
        &config.private_key,
        &config.application_id,
        Some(username),
        None,
    )
}

/// Service token without a subject, with the default wildcard ACL.
pub fn issue_backend_token(issuer: &TokenIssuer, config: &Config) -> Result<String, VoiceError> {
    issuer.issue(&config.private_key, &config.application_id, None, None)
}
