//! Common test utilities for folio-core integration tests

pub mod mock_cache;
pub mod mock_repos;

use std::sync::Arc;

use folio_core::{Argon2Hasher, CoreConfig, FolioService, ManualClock};

#[allow(unused_imports)]
pub use mock_cache::SwitchableCache;
#[allow(unused_imports)]
pub use mock_repos::{MockArticleRepository, MockPrincipalRepository};

pub const TEST_SECRET: &str = "test-secret-that-is-at-least-32-bytes";

pub type TestService = FolioService<MockPrincipalRepository, MockArticleRepository, SwitchableCache>;

/// Service wired to in-memory repositories, a switchable cache and a manual clock
#[allow(dead_code)]
pub struct Harness {
    pub service: TestService,
    pub principals: Arc<MockPrincipalRepository>,
    pub articles: Arc<MockArticleRepository>,
    pub cache: Arc<SwitchableCache>,
    pub clock: Arc<ManualClock>,
}

#[allow(dead_code)]
impl Harness {
    pub fn new() -> Self {
        Self::with_config(CoreConfig::new(TEST_SECRET))
    }

    pub fn with_config(config: CoreConfig) -> Self {
        let principals = Arc::new(MockPrincipalRepository::new());
        let articles = Arc::new(MockArticleRepository::new(Arc::clone(&principals)));
        let cache = Arc::new(SwitchableCache::new());
        let clock = Arc::new(ManualClock::default());
        let hasher = Argon2Hasher::with_cost(argon2::Params::MIN_M_COST, 1, 1).expect("cheap argon2 params");

        let service = FolioService::with_components(
            config,
            Arc::clone(&principals),
            Arc::clone(&articles),
            Arc::clone(&cache),
            Arc::new(hasher),
            clock.clone(),
        )
        .expect("valid test service");

        Self {
            service,
            principals,
            articles,
            cache,
            clock,
        }
    }

    /// Register a principal and return its bearer token
    pub async fn login(&self, email: &str, name: &str) -> String {
        self.service
            .register(email, "secret1", name)
            .await
            .expect("register");
        self.service
            .authenticate(email, "secret1")
            .await
            .expect("authenticate")
            .token
            .token
    }
}
