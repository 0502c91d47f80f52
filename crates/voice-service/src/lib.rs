//! Voice webhook server library.
//!
//! Answers inbound-call webhooks from the Nexmo/Vonage Voice API with
//! call-control documents, accepts call events, and issues RS256 capability
//! tokens. In development mode it provisions its own webhooks through a
//! public tunnel before serving.
//!
//! # Modules
//!
//! - `config` - Environment configuration
//! - `crypto` - RS256 signing and verification
//! - `errors` - Handler error type
//! - `handlers` - HTTP request handlers
//! - `middleware` - HTTP metrics middleware
//! - `models` - Request/response types
//! - `ncco` - Call-control document synthesis
//! - `observability` - Tracing and Prometheus setup
//! - `routes` - Router and shared state
//! - `services` - Token issuance, provider API, tunnel, start-up provisioning

pub mod config;
pub mod crypto;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod ncco;
pub mod observability;
pub mod routes;
pub mod services;

pub use crypto::verify_jwt as verify_token;
