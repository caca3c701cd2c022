//! Configuration validation module.
//!
//! Collects every problem in one pass so a misconfigured deployment fails
//! fast with a complete report instead of one error at a time.

use crate::{AppConfig, CacheConfig, CacheProvider, ObservabilityConfig, ServerConfig};
use std::fmt;
use url::Url;

/// Configuration validation error variants.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValidationError {
    /// Port number is invalid (must be 1-65535).
    InvalidPort { name: String, value: u16 },
    /// Host name is empty.
    EmptyHost { name: String },
    /// URL format is invalid.
    InvalidUrl { url_type: String, message: String },
    /// Timeout or TTL value must be positive.
    NonPositiveValue { name: String },
    /// Pool size must be at least one and below the maximum.
    InvalidPoolSize { value: usize, maximum: usize },
    /// Key prefix contains the key separator or whitespace.
    InvalidKeyPrefix { value: String },
    /// Log level is invalid.
    InvalidLogLevel { value: String },
}

impl fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPort { name, value } => {
                write!(f, "Invalid port for {}: {} (must be 1-65535)", name, value)
            }
            Self::EmptyHost { name } => write!(f, "Host for {} cannot be empty", name),
            Self::InvalidUrl { url_type, message } => {
                write!(f, "Invalid {} URL: {}", url_type, message)
            }
            Self::NonPositiveValue { name } => write!(f, "'{}' must be positive", name),
            Self::InvalidPoolSize { value, maximum } => {
                write!(f, "Invalid pool size {} (must be 1-{})", value, maximum)
            }
            Self::InvalidKeyPrefix { value } => {
                write!(f, "Invalid key prefix '{}' (no ':' or whitespace allowed)", value)
            }
            Self::InvalidLogLevel { value } => {
                write!(
                    f,
                    "Invalid log level: '{}' (valid: trace, debug, info, warn, error)",
                    value
                )
            }
        }
    }
}

impl std::error::Error for ConfigValidationError {}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Maximum connection pool size.
    const MAX_POOL_SIZE: usize = 1024;
    /// Valid log levels.
    const VALID_LOG_LEVELS: &'static [&'static str] = &["trace", "debug", "info", "warn", "error"];

    /// Validates the entire application configuration.
    ///
    /// Returns Ok(()) if valid, or Err with all validation errors found.
    pub fn validate(config: &AppConfig) -> Result<(), Vec<ConfigValidationError>> {
        let mut errors = Vec::new();

        Self::validate_server(&config.server, &mut errors);
        Self::validate_cache(&config.cache, &mut errors);
        Self::validate_observability(&config.observability, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_server(config: &ServerConfig, errors: &mut Vec<ConfigValidationError>) {
        if config.port == 0 {
            errors.push(ConfigValidationError::InvalidPort {
                name: "server.port".to_string(),
                value: config.port,
            });
        }
        if config.request_timeout_secs == 0 {
            errors.push(ConfigValidationError::NonPositiveValue {
                name: "server.request_timeout_secs".to_string(),
            });
        }
    }

    /// Validates the cache settings surface.
    ///
    /// Backend coordinates are only checked when the Redis provider is in
    /// effect. A TTL of zero stores entries without expiry; the backend call
    /// timeout must be positive for every provider.
    fn validate_cache(config: &CacheConfig, errors: &mut Vec<ConfigValidationError>) {
        if config.connection_timeout_ms == 0 {
            errors.push(ConfigValidationError::NonPositiveValue {
                name: "cache.connection_timeout_ms".to_string(),
            });
        }
        if config.key_prefix.is_empty()
            || config.key_prefix.contains(':')
            || config.key_prefix.chars().any(char::is_whitespace)
        {
            errors.push(ConfigValidationError::InvalidKeyPrefix {
                value: config.key_prefix.clone(),
            });
        }
        if config.effective_provider() != CacheProvider::Redis {
            return;
        }

        if config.host.trim().is_empty() {
            errors.push(ConfigValidationError::EmptyHost {
                name: "cache.host".to_string(),
            });
        } else if let Err(e) = Url::parse(&config.redis_url()) {
            errors.push(ConfigValidationError::InvalidUrl {
                url_type: "cache".to_string(),
                message: e.to_string(),
            });
        }
        if config.port == 0 {
            errors.push(ConfigValidationError::InvalidPort {
                name: "cache.port".to_string(),
                value: config.port,
            });
        }
        if config.pool_size == 0 || config.pool_size > Self::MAX_POOL_SIZE {
            errors.push(ConfigValidationError::InvalidPoolSize {
                value: config.pool_size,
                maximum: Self::MAX_POOL_SIZE,
            });
        }
    }

    fn validate_observability(config: &ObservabilityConfig, errors: &mut Vec<ConfigValidationError>) {
        let level = config.log_level.to_lowercase();
        if !Self::VALID_LOG_LEVELS.contains(&level.as_str()) {
            errors.push(ConfigValidationError::InvalidLogLevel {
                value: config.log_level.clone(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NamespaceConfig;

    #[test]
    fn test_default_config_is_valid() {
        assert!(ConfigValidator::validate(&AppConfig::default()).is_ok());
    }

    #[test]
    fn test_zero_ttl_accepted_zero_timeout_rejected() {
        let mut config = AppConfig::default();
        config.cache.default_ttl_seconds = 0;
        config
            .cache
            .namespaces
            .insert("userById".to_string(), NamespaceConfig { ttl_seconds: 0 });
        assert!(ConfigValidator::validate(&config).is_ok());

        config.cache.connection_timeout_ms = 0;
        let errors = ConfigValidator::validate(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ConfigValidationError::NonPositiveValue {
                name: "cache.connection_timeout_ms".to_string()
            }]
        );
    }

    #[test]
    fn test_redis_coordinates_checked_only_for_redis() {
        let mut config = AppConfig::default();
        config.cache.host = String::new();
        config.cache.port = 0;
        assert_eq!(ConfigValidator::validate(&config).unwrap_err().len(), 2);

        config.cache.provider = CacheProvider::Memory;
        assert!(ConfigValidator::validate(&config).is_ok());
    }

    #[test]
    fn test_key_prefix_with_separator_rejected() {
        let mut config = AppConfig::default();
        config.cache.key_prefix = "a:b".to_string();
        let errors = ConfigValidator::validate(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ConfigValidationError::InvalidKeyPrefix { value: "a:b".to_string() }]
        );
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = AppConfig::default();
        config.observability.log_level = "loud".to_string();
        let errors = ConfigValidator::validate(&config).unwrap_err();
        assert!(matches!(errors[0], ConfigValidationError::InvalidLogLevel { .. }));
    }
}
