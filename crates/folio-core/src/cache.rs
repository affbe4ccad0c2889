//! Cache-aside query layer for article listings
//!
//! Listing pages are cached as JSON under a key derived only from the filter.
//! Reads go cache first and fall back to the store; writes never update
//! entries, they clear them (see [`crate::invalidation`]).
//!
//! The cache is never required for correctness. A failed read counts as a
//! miss and a failed write is logged and dropped.
//!
//! A page loaded from the store is only cached if no write started in the
//! meantime, tracked by [`CacheGeneration`]. Without that a slow miss could
//! put a pre-write page back after the write's clear.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::SecondsFormat;
use folio_db::ArticleRepository;
use folio_types::{ArticleFilter, ArticlePage};
use moka::future::Cache;
use moka::Expiry;
use thiserror::Error;
use tracing::instrument;

use crate::articles::ArticleStore;
use crate::metrics::{self, CacheOp};
use crate::CoreError;

/// Namespace of all article listing keys
pub const ARTICLE_LIST_NAMESPACE: &str = "articles:list";

/// Bumped whenever the cached payload shape changes
const KEY_VERSION: &str = "v1";

/// Cache backend errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    #[error("cache unavailable: {0}")]
    Unavailable(String),

    #[error("cache operation failed: {0}")]
    Backend(String),
}

/// Key-value cache with per-entry TTL and a full clear
#[async_trait]
pub trait QueryCache: Send + Sync {
    /// Read a value, `None` on miss
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Store a value that expires after `ttl`
    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError>;

    /// Drop every entry
    async fn clear(&self) -> Result<(), CacheError>;
}

/// Encode a listing filter as a cache key.
///
/// Each field is tagged and absent filters are written as `*`, which no
/// present value can produce. The timestamp is last because its RFC 3339
/// form contains `:`.
pub fn cache_key(namespace: &str, filter: &ArticleFilter) -> String {
    let author = filter
        .owner_id()
        .map_or_else(|| "*".to_string(), |id| id.to_string());
    let after = filter.published_after().map_or_else(
        || "*".to_string(),
        |at| at.to_rfc3339_opts(SecondsFormat::Nanos, true),
    );
    format!(
        "{namespace}:{KEY_VERSION}:page={}:limit={}:author={author}:after={after}",
        filter.page(),
        filter.page_size(),
    )
}

#[derive(Clone)]
struct Entry {
    value: Arc<str>,
    ttl: Duration,
}

struct EntryTtl;

impl Expiry<String, Entry> for EntryTtl {
    fn expire_after_create(&self, _key: &String, entry: &Entry, _created_at: Instant) -> Option<Duration> {
        Some(entry.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        entry: &Entry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }
}

/// In-process [`QueryCache`] backed by moka
#[derive(Clone)]
pub struct MokaQueryCache {
    entries: Cache<String, Entry>,
}

impl MokaQueryCache {
    /// Create a cache bounded to `max_entries`
    pub fn new(max_entries: u64) -> Self {
        let entries = Cache::builder()
            .max_capacity(max_entries)
            .expire_after(EntryTtl)
            .build();
        Self { entries }
    }

    /// Approximate number of live entries
    pub fn entry_count(&self) -> u64 {
        self.entries.entry_count()
    }

}

impl std::fmt::Debug for MokaQueryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaQueryCache")
            .field("entries", &self.entries.entry_count())
            .finish()
    }
}

#[async_trait]
impl QueryCache for MokaQueryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.entries.get(key).await.map(|e| e.value.to_string()))
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        self.entries
            .insert(
                key.to_string(),
                Entry {
                    value: value.into(),
                    ttl,
                },
            )
            .await;
        Ok(())
    }

    async fn clear(&self) -> Result<(), CacheError> {
        self.entries.invalidate_all();
        Ok(())
    }
}

/// Write counter shared by listing reads and the invalidation coordinator
#[derive(Debug, Clone, Default)]
pub struct CacheGeneration(Arc<AtomicU64>);

impl CacheGeneration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }

    /// Mark that a write committed; pages read before this must not be cached
    pub fn advance(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }
}

/// Article listing with a cache in front of the store
pub struct CachedArticleQuery<A: ArticleRepository + ?Sized, C: QueryCache> {
    store: ArticleStore<A>,
    cache: Arc<C>,
    generation: CacheGeneration,
    ttl: Duration,
}

impl<A: ArticleRepository + ?Sized, C: QueryCache> Clone for CachedArticleQuery<A, C> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            cache: Arc::clone(&self.cache),
            generation: self.generation.clone(),
            ttl: self.ttl,
        }
    }
}

impl<A: ArticleRepository + ?Sized, C: QueryCache> CachedArticleQuery<A, C> {
    pub fn new(
        store: ArticleStore<A>,
        cache: Arc<C>,
        generation: CacheGeneration,
        ttl: Duration,
    ) -> Self {
        Self {
            store,
            cache,
            generation,
            ttl,
        }
    }

    /// Load one page, serving it from cache when possible
    #[instrument(skip(self), level = "debug")]
    pub async fn find_page(&self, filter: &ArticleFilter) -> Result<ArticlePage, CoreError> {
        let key = cache_key(ARTICLE_LIST_NAMESPACE, filter);

        if let Some(page) = self.read(&key).await {
            tracing::trace!(%key, "listing cache hit");
            metrics::record_cache_hit();
            return Ok(page);
        }

        metrics::record_cache_miss();
        let seen = self.generation.current();
        let page = self.store.find_page(filter).await?;

        if self.generation.current() != seen {
            tracing::debug!(%key, "Write during listing read, not caching page");
            return Ok(page);
        }
        self.write(&key, &page).await;

        // A write may have cleared between the check and the set
        if self.generation.current() != seen {
            tracing::debug!(%key, "Write raced listing cache fill, clearing");
            if let Err(e) = self.cache.clear().await {
                tracing::warn!(%key, error = %e, "Cache clear after raced fill failed");
                metrics::record_cache_error(CacheOp::Clear);
            }
        }
        Ok(page)
    }

    async fn read(&self, key: &str) -> Option<ArticlePage> {
        let raw = match self.cache.get(key).await {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!(%key, error = %e, "Cache read failed, falling back to store");
                metrics::record_cache_error(CacheOp::Get);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(page) => Some(page),
            Err(e) => {
                tracing::warn!(%key, error = %e, "Discarding undecodable cache entry");
                metrics::record_cache_error(CacheOp::Decode);
                None
            }
        }
    }

    async fn write(&self, key: &str, page: &ArticlePage) {
        let raw = match serde_json::to_string(page) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(%key, error = %e, "Failed to encode listing page");
                metrics::record_cache_error(CacheOp::Encode);
                return;
            }
        };

        if let Err(e) = self.cache.set(key, raw, self.ttl).await {
            tracing::warn!(%key, error = %e, "Cache write failed");
            metrics::record_cache_error(CacheOp::Set);
        }
    }
}
