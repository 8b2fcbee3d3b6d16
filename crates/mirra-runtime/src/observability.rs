//! Logging setup

use tracing_subscriber::EnvFilter;

use mirra_core::{MirraError, MirraResult};

use crate::LoggingConfig;

/// Environment variable that overrides the configured filter
pub const LOG_ENV_VAR: &str = "MIRRA_LOG";

fn build_filter(config: &LoggingConfig) -> MirraResult<EnvFilter> {
    match EnvFilter::try_from_env(LOG_ENV_VAR) {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&config.level).map_err(|e| {
            MirraError::InvalidArgument(format!("log level {:?}: {e}", config.level))
        }),
    }
}

/// Install the global tracing subscriber
///
/// Fails if the level directive does not parse or a subscriber is already set.
pub fn init_logging(config: &LoggingConfig) -> MirraResult<()> {
    let filter = build_filter(config)?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let result = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    result.map_err(|e| MirraError::InvalidArgument(format!("logging already initialized: {e}")))
}
