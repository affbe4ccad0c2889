//! Configuration types for the core services

use std::time::Duration;

use folio_types::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

use crate::CoreError;

/// Core configuration
#[derive(Clone)]
pub struct CoreConfig {
    /// HMAC secret for signing session tokens
    pub token_secret: String,
    /// How long an issued token stays valid
    pub token_lifetime: Duration,
    /// Time-to-live of cached listing pages
    pub cache_ttl: Duration,
    /// Maximum number of cached listing pages
    pub cache_max_entries: u64,
    /// Page size when the caller omits one
    pub default_page_size: u32,
    /// Largest page size accepted
    pub max_page_size: u32,
    /// Cache clear attempts after each write before giving up
    pub invalidation_attempts: u32,
}

impl CoreConfig {
    /// Minimum token secret length in bytes (256 bits)
    pub const MIN_SECRET_LENGTH: usize = 32;

    /// Create a new config with default durations and limits
    pub fn new(token_secret: impl Into<String>) -> Self {
        Self {
            token_secret: token_secret.into(),
            token_lifetime: Duration::from_secs(60 * 60), // 1 hour
            cache_ttl: Duration::from_secs(60),
            cache_max_entries: 10_000,
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
            invalidation_attempts: 2,
        }
    }

    /// Create a config, rejecting secrets shorter than [`Self::MIN_SECRET_LENGTH`]
    pub fn try_new(token_secret: impl Into<String>) -> Result<Self, CoreError> {
        let config = Self::new(token_secret);
        config.validate()?;
        Ok(config)
    }

    /// Check invariants that the builder methods cannot enforce
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.token_secret.len() < Self::MIN_SECRET_LENGTH {
            return Err(CoreError::Configuration(format!(
                "token secret must be at least {} bytes, got {}",
                Self::MIN_SECRET_LENGTH,
                self.token_secret.len()
            )));
        }
        if self.default_page_size == 0 || self.default_page_size > self.max_page_size {
            return Err(CoreError::Configuration(format!(
                "default page size {} must be between 1 and {}",
                self.default_page_size, self.max_page_size
            )));
        }
        Ok(())
    }

    /// Set token lifetime
    pub fn with_token_lifetime(mut self, lifetime: Duration) -> Self {
        self.token_lifetime = lifetime;
        self
    }

    /// Set cache TTL
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Set cache capacity
    pub fn with_cache_max_entries(mut self, max: u64) -> Self {
        self.cache_max_entries = max;
        self
    }

    /// Set default and maximum page sizes
    pub fn with_page_sizes(mut self, default_page_size: u32, max_page_size: u32) -> Self {
        self.default_page_size = default_page_size;
        self.max_page_size = max_page_size;
        self
    }

    /// Set invalidation attempts (at least one attempt is always made)
    pub fn with_invalidation_attempts(mut self, attempts: u32) -> Self {
        self.invalidation_attempts = attempts.max(1);
        self
    }
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("token_secret_length", &self.token_secret.len())
            .field("token_lifetime", &self.token_lifetime)
            .field("cache_ttl", &self.cache_ttl)
            .field("cache_max_entries", &self.cache_max_entries)
            .field("default_page_size", &self.default_page_size)
            .field("max_page_size", &self.max_page_size)
            .field("invalidation_attempts", &self.invalidation_attempts)
            .finish()
    }
}
