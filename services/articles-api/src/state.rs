//! Application state

use std::ops::Deref;
use std::sync::Arc;

use folio_core::{FolioService, MokaQueryCache};
use folio_db::{ArticleRepository, DbPool, PrincipalRepository};

use crate::config::Config;

/// Folio service over boxed repositories and the in-process listing cache
pub type FolioServiceImpl = FolioService<dyn PrincipalRepository, dyn ArticleRepository, MokaQueryCache>;

/// Shared database pool wrapper for health checks
#[derive(Clone)]
pub struct SharedPool(Arc<DbPool>);

impl Deref for SharedPool {
    type Target = DbPool;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub folio: Arc<FolioServiceImpl>,
    /// Listing cache, also held by `folio`; read here for readiness
    pub cache: Arc<MokaQueryCache>,
    /// Database connection pool (shared reference for health checks)
    pub pool: SharedPool,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(
        folio: FolioServiceImpl,
        cache: Arc<MokaQueryCache>,
        pool: DbPool,
        config: Config,
    ) -> Self {
        Self {
            folio: Arc::new(folio),
            cache,
            pool: SharedPool(Arc::new(pool)),
            config: Arc::new(config),
        }
    }

    /// Get request timeout from config
    pub fn request_timeout(&self) -> std::time::Duration {
        self.config.request_timeout
    }
}
