//! Fixed RSA key pairs for tests.
//!
//! `TEST_PRIVATE_KEY_PEM` is what [`crate::TestVoiceServer`] signs with, so
//! tokens it returns verify against `TEST_PUBLIC_KEY_PEM`.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};

pub use common::test_keys::{
    OTHER_PRIVATE_KEY_PEM, OTHER_PUBLIC_KEY_PEM, PRIVATE_KEY_PEM as TEST_PRIVATE_KEY_PEM,
    PUBLIC_KEY_PEM as TEST_PUBLIC_KEY_PEM,
};

/// Application id used by the test configuration.
pub const TEST_APPLICATION_ID: &str = "aaaaaaaa-bbbb-cccc-dddd-0123456789ab";

/// Decode one base64url JWT segment (header or payload) into JSON.
///
/// No signature check.
pub fn decode_segment(segment: &str) -> Result<serde_json::Value, anyhow::Error> {
    let bytes = URL_SAFE_NO_PAD.decode(segment)?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Decode the claims of a compact JWT without verifying it.
pub fn decode_claims(token: &str) -> Result<serde_json::Value, anyhow::Error> {
    let payload = token
        .split('.')
        .nth(1)
        .ok_or_else(|| anyhow::anyhow!("token has no payload segment"))?;
    decode_segment(payload)
}
