//! Cache double that can be told to fail

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use folio_core::{CacheError, MokaQueryCache, QueryCache};

/// A real moka cache whose operations can be switched to fail
pub struct SwitchableCache {
    inner: MokaQueryCache,
    fail_get: AtomicBool,
    fail_set: AtomicBool,
    fail_clear: AtomicBool,
    clears: AtomicUsize,
}

#[allow(dead_code)]
impl SwitchableCache {
    pub fn new() -> Self {
        Self {
            inner: MokaQueryCache::new(1_000),
            fail_get: AtomicBool::new(false),
            fail_set: AtomicBool::new(false),
            fail_clear: AtomicBool::new(false),
            clears: AtomicUsize::new(0),
        }
    }

    pub fn fail_get(&self, fail: bool) {
        self.fail_get.store(fail, Ordering::SeqCst);
    }

    pub fn fail_set(&self, fail: bool) {
        self.fail_set.store(fail, Ordering::SeqCst);
    }

    pub fn fail_clear(&self, fail: bool) {
        self.fail_clear.store(fail, Ordering::SeqCst);
    }

    /// Successful clears so far
    pub fn clears(&self) -> usize {
        self.clears.load(Ordering::SeqCst)
    }

    /// Direct access, bypassing the failure switches
    pub fn inner(&self) -> &MokaQueryCache {
        &self.inner
    }
}

#[async_trait]
impl QueryCache for SwitchableCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        if self.fail_get.load(Ordering::SeqCst) {
            return Err(CacheError::Unavailable("get switched off".to_string()));
        }
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        if self.fail_set.load(Ordering::SeqCst) {
            return Err(CacheError::Unavailable("set switched off".to_string()));
        }
        self.inner.set(key, value, ttl).await
    }

    async fn clear(&self) -> Result<(), CacheError> {
        if self.fail_clear.load(Ordering::SeqCst) {
            return Err(CacheError::Unavailable("clear switched off".to_string()));
        }
        self.clears.fetch_add(1, Ordering::SeqCst);
        self.inner.clear().await
    }
}
