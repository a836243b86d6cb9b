//! Logging setup and configuration

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Levels accepted in configuration files and on the command line
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Check that `level` is one of [`LOG_LEVELS`]
pub fn validate_level(level: &str) -> crate::Result<()> {
    if LOG_LEVELS.contains(&level) {
        Ok(())
    } else {
        Err(crate::Error::Config(format!(
            "Invalid log level '{}', must be one of: {}",
            level,
            LOG_LEVELS.join(", ")
        )))
    }
}

/// Setup tracing subscriber for the application
///
/// `RUST_LOG` takes precedence over `default_level`. Events go to stderr so
/// that reports printed on stdout stay clean.
pub fn setup_logging(default_level: &str) -> crate::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| crate::Error::Config(format!("Invalid log filter: {}", e)))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init()
        .map_err(|e| crate::Error::Config(format!("Logging already initialized: {}", e)))?;

    Ok(())
}
