//! RS256 signing and verification of capability tokens.

use crate::errors::VoiceError;
use common::jwt::{check_token_shape, CapabilityClaims};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use tracing::instrument;

/// Sign capability claims with an RSA private key (PEM, PKCS#1 or PKCS#8).
///
/// The key is parsed on every call. A malformed or non-RSA key yields
/// `VoiceError::Crypto`; callers turn that into a failed request.
#[instrument(skip_all)]
pub fn sign_jwt(claims: &CapabilityClaims, private_key_pem: &str) -> Result<String, VoiceError> {
    let encoding_key = EncodingKey::from_rsa_pem(private_key_pem.as_bytes())
        .map_err(|e| VoiceError::Crypto(format!("Invalid private key format: {}", e)))?;

    let mut header = Header::new(Algorithm::RS256);
    header.typ = Some("JWT".to_string());

    let token = encode(&header, claims, &encoding_key)
        .map_err(|e| VoiceError::Crypto(format!("JWT signing operation failed: {}", e)))?;

    Ok(token)
}

/// Verify an RS256 capability token against a public key (SPKI or PKCS#1 PEM).
///
/// Validates:
/// - Token size and shape (before any decoding)
/// - Signature
/// - `exp` and `nbf`, both required
#[instrument(skip_all)]
pub fn verify_jwt(token: &str, public_key_pem: &str) -> Result<CapabilityClaims, VoiceError> {
    check_token_shape(token).map_err(|e| VoiceError::InvalidToken(e.to_string()))?;

    let decoding_key = DecodingKey::from_rsa_pem(public_key_pem.as_bytes()).map_err(|e| {
        tracing::debug!(target: "voice.crypto", error = %e, "Invalid public key encoding");
        VoiceError::InvalidToken("The token is invalid or expired".to_string())
    })?;

    let mut validation = Validation::new(Algorithm::RS256);
    validation.validate_exp = true;
    validation.validate_nbf = true;
    validation.set_required_spec_claims(&["exp", "nbf"]);

    let token_data = decode::<CapabilityClaims>(token, &decoding_key, &validation).map_err(|e| {
        tracing::debug!(target: "voice.crypto", error = %e, "Token verification failed");
        VoiceError::InvalidToken("The token is invalid or expired".to_string())
    })?;

    Ok(token_data.claims)
}
