//! Tracing subscriber setup.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::TelemetryConfig;
use crate::domain::ChainError;

/// Install the global subscriber.
///
/// `RUST_LOG` takes precedence over `config.log_level`. Fails if a subscriber
/// is already installed.
pub fn init_tracing(config: &TelemetryConfig) -> Result<(), ChainError> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .map_err(|e| ChainError::Config(e.to_string()))?;

    if config.json_logs {
        let json_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(json_layer)
            .try_init()
            .map_err(|e| ChainError::Config(e.to_string()))?;
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .with_ansi(true);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()
            .map_err(|e| ChainError::Config(e.to_string()))?;
    }

    tracing::info!(
        log_level = %config.log_level,
        json = config.json_logs,
        "[pc-05] tracing initialized"
    );
    Ok(())
}
