//! Logging initialisation.
//!
//! Sets up a `tracing` subscriber with an `EnvFilter` and either a
//! human-readable or a JSON formatter.

#[cfg(feature = "logging")]
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::StashResult;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default filter directives when `RUST_LOG` is not set.
pub const DEFAULT_LOG_FILTER: &str = "info,stash=debug,tower_http=debug";

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable multi-field output.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pretty => write!(f, "pretty"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Base level used when `RUST_LOG` is not set.
    pub level: String,
    /// Output format.
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

impl LoggingConfig {
    /// Returns the filter directives derived from the configured level.
    #[must_use]
    pub fn filter_directives(&self) -> String {
        if self.level.is_empty() || self.level == "info" {
            DEFAULT_LOG_FILTER.to_string()
        } else {
            format!("{},stash={},tower_http={}", self.level, self.level, self.level)
        }
    }
}

/// Initialize logging with the given configuration.
///
/// `RUST_LOG` takes precedence over the configured level.
#[cfg(feature = "logging")]
pub fn init_logging(config: &LoggingConfig) -> StashResult<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.filter_directives()));

    let registry = tracing_subscriber::registry().with(filter);

    let result = match config.format {
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .try_init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .try_init(),
    };

    result.map_err(|e| crate::StashError::internal(format!("Failed to initialize logging: {}", e)))?;

    tracing::info!(level = %config.level, format = %config.format, "Logging initialized");
    Ok(())
}

/// Placeholder for when the logging feature is disabled.
#[cfg(not(feature = "logging"))]
pub fn init_logging(_config: &LoggingConfig) -> StashResult<()> {
    Ok(())
}
