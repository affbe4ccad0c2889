//! PostgreSQL repository implementations

mod article;
mod principal;

pub use article::PgArticleRepository;
pub use principal::PgPrincipalRepository;

use crate::DbPool;

/// All repositories bundled together
#[derive(Clone)]
pub struct Repositories {
    pub principals: PgPrincipalRepository,
    pub articles: PgArticleRepository,
}

impl Repositories {
    /// Create all repositories from a database pool
    pub fn new(pool: DbPool) -> Self {
        Self {
            principals: PgPrincipalRepository::new(pool.clone()),
            articles: PgArticleRepository::new(pool),
        }
    }
}
