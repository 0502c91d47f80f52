//! Custom test assertions for capability tokens.

use crate::crypto_fixtures::{decode_claims, decode_segment};

/// Fluent assertions on a compact JWT string.
///
/// # Example
/// ```rust,ignore
/// token
///     .assert_valid_jwt()
///     .assert_for_subject("alice")
///     .assert_expires_in(3600);
/// ```
pub trait TokenAssertions {
    /// Three segments, RS256 header with `typ: JWT`.
    fn assert_valid_jwt(&self) -> &Self;

    /// `sub` equals `subject`.
    fn assert_for_subject(&self, subject: &str) -> &Self;

    /// No `sub` claim (backend token).
    fn assert_no_subject(&self) -> &Self;

    /// `application_id` equals `application_id`.
    fn assert_for_application(&self, application_id: &str) -> &Self;

    /// `nbf == iat` and `exp - iat == seconds`.
    fn assert_expires_in(&self, seconds: i64) -> &Self;

    /// ACL is the single wildcard path.
    fn assert_unrestricted_acl(&self) -> &Self;
}

impl TokenAssertions for String {
    fn assert_valid_jwt(&self) -> &Self {
        let parts: Vec<_> = self.split('.').collect();
        assert_eq!(
            parts.len(),
            3,
            "JWT must have 3 parts (header.payload.signature), got {}",
            parts.len()
        );

        let header = decode_segment(parts[0]).expect("JWT header should decode");
        assert_eq!(header["alg"], "RS256", "Expected RS256 algorithm");
        assert_eq!(header["typ"], "JWT", "Expected JWT type");

        decode_claims(self).expect("JWT payload should decode");
        assert!(!parts[2].is_empty(), "JWT signature must not be empty");
        self
    }

    fn assert_for_subject(&self, subject: &str) -> &Self {
        let claims = decode_claims(self).expect("JWT payload should decode");
        assert_eq!(claims["sub"], subject, "Unexpected token subject");
        self
    }

    fn assert_no_subject(&self) -> &Self {
        let claims = decode_claims(self).expect("JWT payload should decode");
        assert!(
            claims.get("sub").is_none(),
            "Backend token must not carry a subject, got {}",
            claims["sub"]
        );
        self
    }

    fn assert_for_application(&self, application_id: &str) -> &Self {
        let claims = decode_claims(self).expect("JWT payload should decode");
        assert_eq!(claims["application_id"], application_id);
        self
    }

    fn assert_expires_in(&self, seconds: i64) -> &Self {
        let claims = decode_claims(self).expect("JWT payload should decode");
        let iat = claims["iat"].as_i64().expect("iat should be an integer");
        let nbf = claims["nbf"].as_i64().expect("nbf should be an integer");
        let exp = claims["exp"].as_i64().expect("exp should be an integer");

        assert_eq!(nbf, iat, "nbf should equal iat");
        assert_eq!(exp - iat, seconds, "Unexpected validity window");

        let now = chrono::Utc::now().timestamp();
        assert!(
            (iat - now).abs() <= 60,
            "iat {iat} is not close to the current time {now}"
        );
        self
    }

    fn assert_unrestricted_acl(&self) -> &Self {
        let claims = decode_claims(self).expect("JWT payload should decode");
        assert_eq!(claims["acl"], serde_json::json!({"paths": {"/**": {}}}));
        self
    }
}
