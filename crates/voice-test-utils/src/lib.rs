//! # Voice Test Utilities
//!
//! Shared test utilities for the voice webhook server.
//!
//! This crate provides:
//! - Server test harness (`TestVoiceServer` for E2E tests)
//! - RSA key fixtures matching the server's test configuration
//! - Custom assertions (`TokenAssertions` trait)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use voice_test_utils::*;
//!
//! #[tokio::test]
//! async fn test_example() -> Result<(), anyhow::Error> {
//!     let server = TestVoiceServer::spawn().await?;
//!
//!     let response: serde_json::Value = reqwest::Client::new()
//!         .post(format!("{}/tokens/alice", server.url()))
//!         .send()
//!         .await?
//!         .json()
//!         .await?;
//!
//!     response["token"]
//!         .as_str()
//!         .unwrap()
//!         .to_string()
//!         .assert_valid_jwt()
//!         .assert_for_subject("alice");
//!     Ok(())
//! }
//! ```

pub mod assertions;
pub mod crypto_fixtures;
pub mod server_harness;

pub use assertions::*;
pub use crypto_fixtures::*;
pub use server_harness::*;
