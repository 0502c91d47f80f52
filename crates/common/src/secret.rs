//! Secret types for protecting sensitive values from accidental logging.
//!
//! This module re-exports types from the [`secrecy`] crate. Use them for the
//! application private key, the provider API secret and any issued token that
//! is held in memory longer than a single response.
//!
//! `SecretString` implements `Debug` with redaction, so a struct that derives
//! `Debug` and holds one is safe to log with `{:?}` or through `tracing`.
//!
//! # Example
//!
//! ```rust
//! use common::secret::{ExposeSecret, SecretString};
//!
//! #[derive(Debug)]
//! struct ProviderAccount {
//!     api_key: String,
//!     api_secret: SecretString, // Debug shows "[REDACTED]"
//! }
//!
//! let account = ProviderAccount {
//!     api_key: "abc123".to_string(),
//!     api_secret: SecretString::from("s3cr3t"),
//! };
//!
//! println!("{:?}", account);
//! let secret: &str = account.api_secret.expose_secret();
//! assert_eq!(secret, "s3cr3t");
//! ```

pub use secrecy::{ExposeSecret, SecretString};
