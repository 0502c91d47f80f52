//! Common utilities and types shared across the voice webhook server crates.

#![warn(clippy::pedantic)]

/// Module for secret types that prevent accidental logging
pub mod secret;

/// Module for capability token claims, ACLs and size limits
pub mod jwt;

/// Module for deterministic RSA key fixtures (tests only)
#[cfg(any(test, feature = "test-utils"))]
pub mod test_keys;
