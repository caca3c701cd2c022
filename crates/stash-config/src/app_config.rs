//! Application configuration structures.

use serde::{Deserialize, Serialize};
use stash_core::{LogFormat, LoggingConfig};
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application name and metadata.
    #[serde(default)]
    pub app: AppMetadata,

    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Cache configuration.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// Application metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppMetadata {
    /// Application name.
    pub name: String,
    /// Application version.
    pub version: String,
    /// Environment (development, staging, production).
    pub environment: String,
}

impl Default for AppMetadata {
    fn default() -> Self {
        Self {
            name: "stash".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            environment: "development".to_string(),
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// REST server host.
    pub host: String,
    /// REST server port.
    pub port: u16,
    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            request_timeout_secs: 30,
        }
    }
}

impl ServerConfig {
    /// Returns the REST server address.
    #[must_use]
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns the request timeout as a Duration.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Cache backend kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheProvider {
    /// Remote Redis backend.
    #[default]
    Redis,
    /// In-process map, for local development and tests.
    Memory,
    /// Caching disabled; every lookup is a miss.
    None,
}

impl fmt::Display for CacheProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Redis => write!(f, "redis"),
            Self::Memory => write!(f, "memory"),
            Self::None => write!(f, "none"),
        }
    }
}

/// Per-namespace cache policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceConfig {
    /// TTL override in seconds for keys of this namespace.
    #[serde(alias = "ttlSeconds", alias = "ttlseconds")]
    pub ttl_seconds: u64,
}

/// Cache configuration.
///
/// Field names accept the snake_case form and the camelCase settings names
/// (`defaultTtlSeconds`, `connectionTimeoutMs`, ...). The loader folds key
/// case, so each camelCase name is also accepted in lowercase.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Master switch. When false the provider is ignored and caching is off.
    pub enabled: bool,
    /// Backend kind.
    pub provider: CacheProvider,
    /// Backend host.
    pub host: String,
    /// Backend port.
    pub port: u16,
    /// Default TTL in seconds for populated entries.
    #[serde(alias = "defaultTtlSeconds", alias = "defaultttlseconds")]
    pub default_ttl_seconds: u64,
    /// Upper bound in milliseconds for every backend call.
    #[serde(alias = "connectionTimeoutMs", alias = "connectiontimeoutms")]
    pub connection_timeout_ms: u64,
    /// Backend connection pool size.
    #[serde(alias = "poolSize", alias = "poolsize")]
    pub pool_size: usize,
    /// Prefix prepended to every rendered key.
    #[serde(alias = "keyPrefix", alias = "keyprefix")]
    pub key_prefix: String,
    /// Coalesce concurrent misses on the same key into one origin call.
    #[serde(alias = "singleFlight", alias = "singleflight")]
    pub single_flight: bool,
    /// Per-namespace overrides, keyed by namespace name.
    pub namespaces: HashMap<String, NamespaceConfig>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        let mut namespaces = HashMap::new();
        namespaces.insert(
            "userExistsByUsername".to_string(),
            NamespaceConfig { ttl_seconds: 60 },
        );

        Self {
            enabled: true,
            provider: CacheProvider::Redis,
            host: "localhost".to_string(),
            port: 6379,
            default_ttl_seconds: 300, // 5 minutes
            connection_timeout_ms: 250,
            pool_size: 16,
            key_prefix: "stash".to_string(),
            single_flight: false,
            namespaces,
        }
    }
}

impl CacheConfig {
    /// Returns the provider actually in effect, honouring `enabled`.
    #[must_use]
    pub const fn effective_provider(&self) -> CacheProvider {
        if self.enabled {
            self.provider
        } else {
            CacheProvider::None
        }
    }

    /// Returns the Redis connection URL.
    #[must_use]
    pub fn redis_url(&self) -> String {
        format!("redis://{}:{}", self.host, self.port)
    }

    /// Returns the default TTL as a Duration.
    #[must_use]
    pub const fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl_seconds)
    }

    /// Returns the backend call timeout as a Duration.
    #[must_use]
    pub const fn connection_timeout(&self) -> Duration {
        Duration::from_millis(self.connection_timeout_ms)
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(alias = "logLevel", alias = "loglevel")]
    pub log_level: String,
    /// Log format (json, pretty).
    #[serde(alias = "logFormat", alias = "logformat")]
    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

impl ObservabilityConfig {
    /// Returns the logging configuration for subscriber initialisation.
    #[must_use]
    pub fn logging(&self) -> LoggingConfig {
        LoggingConfig {
            level: self.log_level.clone(),
            format: self.log_format,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_cache_config() {
        let config = CacheConfig::default();
        assert_eq!(config.provider, CacheProvider::Redis);
        assert_eq!(config.redis_url(), "redis://localhost:6379");
        assert_eq!(config.default_ttl(), Duration::from_secs(300));
        assert_eq!(config.connection_timeout(), Duration::from_millis(250));
    }

    #[test]
    fn test_disabled_cache_has_no_provider() {
        let config = CacheConfig {
            enabled: false,
            provider: CacheProvider::Memory,
            ..Default::default()
        };
        assert_eq!(config.effective_provider(), CacheProvider::None);
    }

    #[test]
    fn test_camel_case_settings_names() {
        let json = r#"{
            "provider": "memory",
            "host": "cache.internal",
            "port": 6380,
            "defaultTtlSeconds": 120,
            "connectionTimeoutMs": 50
        }"#;
        let config: CacheConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.provider, CacheProvider::Memory);
        assert_eq!(config.host, "cache.internal");
        assert_eq!(config.port, 6380);
        assert_eq!(config.default_ttl_seconds, 120);
        assert_eq!(config.connection_timeout_ms, 50);
        assert_eq!(config.key_prefix, "stash");
    }

    #[test]
    fn test_server_address() {
        let config = ServerConfig::default();
        assert_eq!(config.addr(), "0.0.0.0:8080");
    }
}
