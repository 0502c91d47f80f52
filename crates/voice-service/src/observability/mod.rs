//! Logging and metrics setup.

pub mod metrics;

use crate::config::LogFormat;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_LOG_FILTER: &str = "voice_service=debug,voice_server=debug,tower_http=debug";

/// Install the global tracing subscriber.
///
/// `LogFormat::Json` emits one JSON object per event for log shippers.
///
/// # Errors
///
/// Returns error if a global subscriber is already installed.
pub fn init_tracing(format: LogFormat) -> Result<(), String> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let registry = tracing_subscriber::registry().with(filter);

    let result = match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).try_init(),
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).try_init(),
    };

    result.map_err(|e| format!("Failed to install tracing subscriber: {e}"))
}
