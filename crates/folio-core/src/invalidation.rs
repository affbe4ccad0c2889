//! Invalidation coordinator
//!
//! Clears the listing cache after every successful write. A clear that keeps
//! failing does not fail the write; it is logged, counted and the cache may
//! serve stale pages until their TTL runs out.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use folio_types::ArticleId;

use crate::cache::{CacheError, CacheGeneration, QueryCache, ARTICLE_LIST_NAMESPACE};
use crate::metrics;

/// Base delay between clear attempts, multiplied by the attempt number
const RETRY_BACKOFF: Duration = Duration::from_millis(10);

/// A committed article write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    Created(ArticleId),
    Updated(ArticleId),
    Deleted(ArticleId),
}

impl Mutation {
    pub fn article_id(&self) -> ArticleId {
        match self {
            Self::Created(id) | Self::Updated(id) | Self::Deleted(id) => *id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Created(_) => "create",
            Self::Updated(_) => "update",
            Self::Deleted(_) => "delete",
        }
    }
}

/// Result of invalidating after a write
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidationOutcome {
    /// The namespace was cleared
    Cleared { attempts: u32 },
    /// Every attempt failed; stale pages may be served until TTL expiry
    Failed { attempts: u32, error: CacheError },
}

impl InvalidationOutcome {
    pub fn is_cleared(&self) -> bool {
        matches!(self, Self::Cleared { .. })
    }
}

/// Clears cached listings after writes
pub struct InvalidationCoordinator<C: QueryCache> {
    cache: Arc<C>,
    generation: CacheGeneration,
    attempts: u32,
    failures: Arc<AtomicU64>,
}

impl<C: QueryCache> Clone for InvalidationCoordinator<C> {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
            generation: self.generation.clone(),
            attempts: self.attempts,
            failures: Arc::clone(&self.failures),
        }
    }
}

impl<C: QueryCache> InvalidationCoordinator<C> {
    /// Create a coordinator making up to `attempts` clear attempts per write
    pub fn new(cache: Arc<C>, generation: CacheGeneration, attempts: u32) -> Self {
        Self {
            cache,
            generation,
            attempts: attempts.max(1),
            failures: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Clear the listing namespace after `mutation` committed
    pub async fn after_write(&self, mutation: Mutation) -> InvalidationOutcome {
        self.generation.advance();

        let mut attempt = 1;
        loop {
            match self.cache.clear().await {
                Ok(()) => {
                    tracing::debug!(
                        namespace = ARTICLE_LIST_NAMESPACE,
                        mutation = mutation.kind(),
                        article_id = %mutation.article_id(),
                        attempt,
                        "Cleared listing cache"
                    );
                    metrics::record_invalidation();
                    return InvalidationOutcome::Cleared { attempts: attempt };
                }
                Err(error) if attempt >= self.attempts => {
                    tracing::error!(
                        namespace = ARTICLE_LIST_NAMESPACE,
                        mutation = mutation.kind(),
                        article_id = %mutation.article_id(),
                        attempts = attempt,
                        error = %error,
                        "Listing cache clear failed, stale pages possible until TTL expiry"
                    );
                    metrics::record_invalidation_failure();
                    self.failures.fetch_add(1, Ordering::Relaxed);
                    return InvalidationOutcome::Failed {
                        attempts: attempt,
                        error,
                    };
                }
                Err(error) => {
                    tracing::warn!(attempt, error = %error, "Listing cache clear failed, retrying");
                    tokio::time::sleep(RETRY_BACKOFF * attempt).await;
                    attempt += 1;
                }
            }
        }
    }

    /// Number of writes whose clear gave up
    pub fn failure_count(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }
}
