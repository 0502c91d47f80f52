//! Capability token claims shared between the issuer and its consumers.
//!
//! A capability token authorizes its holder against the telephony provider's
//! API. The claim set carries the application identity, an access-control
//! list of path patterns, an optional subject (present for user tokens,
//! absent for backend tokens) and the usual validity window.
//!
//! # Wire shape
//!
//! ```json
//! {
//!   "iat": 1700000000,
//!   "nbf": 1700000000,
//!   "exp": 1700003600,
//!   "jti": "1b0c6a3e-...",
//!   "application_id": "aaaaaaaa-bbbb-cccc-dddd-0123456789ab",
//!   "acl": { "paths": { "/**": {} } },
//!   "sub": "alice"
//! }
//! ```
//!
//! The `sub` key is omitted entirely for backend tokens.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

// =============================================================================
// Constants
// =============================================================================

/// Maximum accepted size of a compact token (8KB).
///
/// Checked before any base64 decoding or signature work. An RS256 capability
/// token with the default ACL is roughly 600 bytes.
pub const MAX_JWT_SIZE_BYTES: usize = 8192;

/// Default validity window for issued tokens (1 hour).
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(3600);

/// Path pattern matching every API path.
pub const WILDCARD_PATH: &str = "/**";

// =============================================================================
// Error Types
// =============================================================================

/// Errors raised by the shared token checks.
///
/// Messages are generic; details go to debug logs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JwtValidationError {
    /// Token size exceeds [`MAX_JWT_SIZE_BYTES`].
    #[error("The token is invalid or expired")]
    TokenTooLarge,

    /// Token is not a three-part compact JWT.
    #[error("The token is invalid or expired")]
    MalformedToken,
}

// =============================================================================
// ACL
// =============================================================================

/// Permission object attached to a path pattern.
///
/// The provider treats an empty object as "all methods allowed"; richer
/// objects (e.g. `{"methods": ["GET"]}`) are passed through untouched.
pub type PathPermissions = serde_json::Map<String, serde_json::Value>;

/// Access-control list carried in the `acl` claim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Acl {
    /// Path pattern to permission object.
    pub paths: BTreeMap<String, PathPermissions>,
}

impl Acl {
    /// ACL granting every path (`{"paths": {"/**": {}}}`).
    #[must_use]
    pub fn unrestricted() -> Self {
        Self::empty().with_path(WILDCARD_PATH, PathPermissions::new())
    }

    /// ACL granting nothing. Extend with [`Acl::with_path`].
    #[must_use]
    pub fn empty() -> Self {
        Self {
            paths: BTreeMap::new(),
        }
    }

    /// Add (or replace) a path pattern.
    #[must_use]
    pub fn with_path(mut self, pattern: impl Into<String>, permissions: PathPermissions) -> Self {
        self.paths.insert(pattern.into(), permissions);
        self
    }
}

impl Default for Acl {
    fn default() -> Self {
        Self::unrestricted()
    }
}

// =============================================================================
// Claims
// =============================================================================

/// Claim set of a capability token.
///
/// `sub` and `jti` are redacted in `Debug` output.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct CapabilityClaims {
    /// Issued-at (Unix epoch seconds).
    pub iat: i64,

    /// Not-before (Unix epoch seconds). Always equal to `iat` when issued here.
    pub nbf: i64,

    /// Expiry (Unix epoch seconds).
    pub exp: i64,

    /// Unique token identifier.
    pub jti: String,

    /// Provider application the token acts for.
    pub application_id: String,

    /// Paths the holder may call.
    pub acl: Acl,

    /// User the token is scoped to. Absent for backend tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
}

impl fmt::Debug for CapabilityClaims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapabilityClaims")
            .field("iat", &self.iat)
            .field("nbf", &self.nbf)
            .field("exp", &self.exp)
            .field("jti", &"[REDACTED]")
            .field("application_id", &self.application_id)
            .field("acl", &self.acl)
            .field("sub", &self.sub.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl CapabilityClaims {
    /// Build a claim set valid from `issued_at` for `ttl_seconds`.
    ///
    /// `nbf` is pinned to `iat`; `exp` is `iat + ttl_seconds`.
    #[must_use]
    pub fn new(
        application_id: String,
        acl: Acl,
        sub: Option<String>,
        issued_at: i64,
        ttl_seconds: i64,
        jti: String,
    ) -> Self {
        Self {
            iat: issued_at,
            nbf: issued_at,
            exp: issued_at.saturating_add(ttl_seconds),
            jti,
            application_id,
            acl,
            sub,
        }
    }

    /// `iat <= nbf < exp`.
    #[must_use]
    pub fn has_valid_window(&self) -> bool {
        self.iat <= self.nbf && self.nbf < self.exp
    }

    /// True for user-scoped tokens.
    #[must_use]
    pub fn is_user_token(&self) -> bool {
        self.sub.is_some()
    }
}

// =============================================================================
// Functions
// =============================================================================

/// Reject oversized or structurally broken tokens before any decoding.
///
/// # Errors
///
/// - `TokenTooLarge` if the token exceeds [`MAX_JWT_SIZE_BYTES`]
/// - `MalformedToken` if the token does not have exactly three non-empty
///   dot-separated parts
pub fn check_token_shape(token: &str) -> Result<(), JwtValidationError> {
    if token.len() > MAX_JWT_SIZE_BYTES {
        tracing::debug!(
            target: "common.jwt",
            token_size = token.len(),
            max_size = MAX_JWT_SIZE_BYTES,
            "Token rejected: size exceeds maximum allowed"
        );
        return Err(JwtValidationError::TokenTooLarge);
    }

    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 || parts.iter().any(|p| p.is_empty()) {
        tracing::debug!(
            target: "common.jwt",
            parts = parts.len(),
            "Token rejected: invalid JWT format"
        );
        return Err(JwtValidationError::MalformedToken);
    }

    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
