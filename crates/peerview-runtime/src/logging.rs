//! Structured logging setup

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use peerview_core::{LogFormat, LoggingConfig, PeerViewError, PeerViewResult};

/// Install the global tracing subscriber
///
/// `RUST_LOG` wins over the configured level. Fails if a global subscriber
/// is already installed or the level is not a valid filter directive.
pub fn init_logging(config: &LoggingConfig) -> PeerViewResult<()> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level)
            .map_err(|e| PeerViewError::InvalidConfig(format!("log level: {}", e)))?,
    };

    let registry = tracing_subscriber::registry().with(env_filter);
    let result = match config.format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_target(true).with_current_span(true))
            .try_init(),
        LogFormat::Pretty => registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .try_init(),
    };

    result.map_err(|e| PeerViewError::InvalidConfig(format!("logging: {}", e)))
}
