//! Configuration for the Articles API service.

use std::time::Duration;

use folio_core::CoreConfig;

/// Articles API configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub http_port: u16,

    /// Database URL
    pub database_url: String,

    /// Maximum database connections
    pub db_max_connections: u32,

    /// Core configuration (token secret, cache, paging)
    pub core: CoreConfig,

    /// Request timeout
    pub request_timeout: Duration,

    /// Metrics enabled
    pub metrics_enabled: bool,

    /// Apply pending migrations at startup
    pub run_migrations: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from any key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Database
        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let db_max_connections = parse_or(&lookup, "DB_MAX_CONNECTIONS", 10)?;

        // Server
        let http_port = parse_or(&lookup, "HTTP_PORT", 8080)?;
        let request_timeout_secs: u64 = parse_or(&lookup, "REQUEST_TIMEOUT_SECS", 30)?;

        // Token secret (minimum 32 bytes)
        let jwt_secret = lookup("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;
        let jwt_ttl_secs: u64 = parse_or(&lookup, "JWT_TTL_SECS", 3600)?;
        if jwt_ttl_secs == 0 {
            return Err(ConfigError::Invalid("JWT_TTL_SECS"));
        }

        // Listing cache
        let cache_ttl_secs: u64 = parse_or(&lookup, "CACHE_TTL_SECS", 60)?;
        let cache_max_entries: u64 = parse_or(&lookup, "CACHE_MAX_ENTRIES", 10_000)?;

        // Flags
        let metrics_enabled = parse_or(&lookup, "METRICS_ENABLED", true)?;
        let run_migrations = parse_or(&lookup, "RUN_MIGRATIONS", true)?;

        let core = CoreConfig::try_new(jwt_secret)
            .map_err(|e| ConfigError::Core(e.to_string()))?
            .with_token_lifetime(Duration::from_secs(jwt_ttl_secs))
            .with_cache_ttl(Duration::from_secs(cache_ttl_secs))
            .with_cache_max_entries(cache_max_entries);

        Ok(Self {
            http_port,
            database_url,
            db_max_connections,
            core,
            request_timeout: Duration::from_secs(request_timeout_secs),
            metrics_enabled,
            run_migrations,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(key)),
        None => Ok(default),
    }
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),

    #[error("Core config error: {0}")]
    Core(String),
}
