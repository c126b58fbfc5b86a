use crate::config::{LogFormat, LoggingConfig};
use crate::error::{Result, RouterError};
use tracing_subscriber::{EnvFilter, fmt, prelude::*, registry};

/// Installs the global subscriber. `RUST_LOG` overrides the configured level.
///
/// Logs go to stderr; stdout is reserved for command output.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let formatting_layer = match config.format {
        LogFormat::Json => fmt::layer().json().with_writer(std::io::stderr).boxed(),
        LogFormat::Pretty => fmt::layer().with_writer(std::io::stderr).boxed(),
    };

    registry()
        .with(env_filter)
        .with(formatting_layer)
        .try_init()
        .map_err(|e| RouterError::Internal(format!("failed to initialize logging: {}", e).into()))
}
