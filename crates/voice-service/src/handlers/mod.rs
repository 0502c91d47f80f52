//! HTTP request handlers.

pub mod health;
pub mod metrics;
pub mod tokens;
pub mod voice;

pub use health::ping;
pub use metrics::metrics_handler;
pub use tokens::create_user_token;
pub use voice::{answer_call, voice_event};
