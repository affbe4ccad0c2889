//! Folio service - ties together identity, tokens, the gate, articles and the cache

use std::future::Future;
use std::sync::Arc;

use folio_db::{ArticleRepository, PrincipalRepository};
use folio_types::{Article, ArticleId, ArticlePage, ArticlePatch, NewArticle, PageQuery, Principal};
use tracing::{instrument, Instrument};

use crate::{
    articles::ArticleStore,
    cache::{CacheGeneration, CachedArticleQuery, QueryCache},
    clock::{Clock, SystemClock},
    config::CoreConfig,
    crypto::{Argon2Hasher, CredentialHasher},
    gate::{AuthContext, AuthorizationGate},
    identity::IdentityStore,
    invalidation::{InvalidationCoordinator, Mutation},
    token::{IssuedToken, TokenIssuer},
    CoreError,
};

/// Result of a successful login
#[derive(Debug, Clone)]
pub struct LoginResult {
    pub token: IssuedToken,
    pub principal: Principal,
}

/// Folio service
///
/// Provides the operations exposed to the request layer:
/// - Registration and login
/// - Cached article listing and lookup
/// - Ownership-checked article writes, each followed by a cache clear
///
/// A write and its cache clear run on their own task, so a caller that stops
/// waiting (timeout, disconnect) cannot leave a committed write uncleared.
pub struct FolioService<P: PrincipalRepository + ?Sized, A: ArticleRepository + ?Sized, C: QueryCache> {
    config: CoreConfig,
    identities: IdentityStore<P>,
    tokens: TokenIssuer,
    gate: AuthorizationGate<P>,
    articles: ArticleStore<A>,
    listings: CachedArticleQuery<A, C>,
    invalidation: InvalidationCoordinator<C>,
}

impl<P, A, C> FolioService<P, A, C>
where
    P: PrincipalRepository + ?Sized + 'static,
    A: ArticleRepository + ?Sized + 'static,
    C: QueryCache + 'static,
{
    /// Create a service with the Argon2 hasher and the system clock
    pub fn new(
        config: CoreConfig,
        principal_repo: Arc<P>,
        article_repo: Arc<A>,
        cache: Arc<C>,
    ) -> Result<Self, CoreError> {
        Self::with_components(
            config,
            principal_repo,
            article_repo,
            cache,
            Arc::new(Argon2Hasher::new()),
            Arc::new(SystemClock),
        )
    }

    /// Create a service with an explicit hasher and clock
    pub fn with_components(
        config: CoreConfig,
        principal_repo: Arc<P>,
        article_repo: Arc<A>,
        cache: Arc<C>,
        hasher: Arc<dyn CredentialHasher>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, CoreError> {
        config.validate()?;

        let tokens = TokenIssuer::from_config(&config)?.with_clock(clock);
        let identities = IdentityStore::new(principal_repo, hasher);
        let gate = AuthorizationGate::new(tokens.clone(), identities.clone());
        let articles = ArticleStore::new(article_repo);
        let generation = CacheGeneration::new();
        let listings = CachedArticleQuery::new(
            articles.clone(),
            Arc::clone(&cache),
            generation.clone(),
            config.cache_ttl,
        );
        let invalidation =
            InvalidationCoordinator::new(cache, generation, config.invalidation_attempts);

        Ok(Self {
            config,
            identities,
            tokens,
            gate,
            articles,
            listings,
            invalidation,
        })
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    // =========================================================================
    // Identity
    // =========================================================================

    /// Register a new principal
    #[instrument(skip(self, secret))]
    pub async fn register(
        &self,
        identity_key: &str,
        secret: &str,
        name: &str,
    ) -> Result<Principal, CoreError> {
        self.identities.register(identity_key, secret, name).await
    }

    /// Check credentials and issue a session token
    #[instrument(skip(self, secret))]
    pub async fn authenticate(
        &self,
        identity_key: &str,
        secret: &str,
    ) -> Result<LoginResult, CoreError> {
        let principal = self.identities.verify_credentials(identity_key, secret).await?;
        let token = self.tokens.issue(&principal)?;
        tracing::info!(principal_id = %principal.id, "Issued session token");
        Ok(LoginResult { token, principal })
    }

    /// Resolve a bearer token to the calling principal
    #[instrument(skip_all)]
    pub async fn authorize(&self, bearer: Option<&str>) -> Result<AuthContext, CoreError> {
        self.gate.authorize(bearer).await
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// List one page of articles, cache first
    #[instrument(skip(self))]
    pub async fn list_articles(&self, query: PageQuery) -> Result<ArticlePage, CoreError> {
        let filter = query.into_filter(self.config.default_page_size, self.config.max_page_size)?;
        self.listings.find_page(&filter).await
    }

    /// Get a single article
    #[instrument(skip(self))]
    pub async fn get_article(&self, id: ArticleId) -> Result<Article, CoreError> {
        self.articles.find_by_id(id).await
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Create an article owned by the bearer
    #[instrument(skip(self, fields, bearer))]
    pub async fn create_article(
        &self,
        fields: NewArticle,
        bearer: Option<&str>,
    ) -> Result<Article, CoreError> {
        let ctx = self.gate.authorize(bearer).await?;
        let articles = self.articles.clone();
        let invalidation = self.invalidation.clone();

        run_detached(async move {
            let article = articles.create(fields, ctx.principal_id).await?;
            invalidation.after_write(Mutation::Created(article.id)).await;
            Ok(article)
        })
        .await
    }

    /// Partially update an article owned by the bearer
    #[instrument(skip(self, patch, bearer))]
    pub async fn update_article(
        &self,
        id: ArticleId,
        patch: ArticlePatch,
        bearer: Option<&str>,
    ) -> Result<Article, CoreError> {
        let ctx = self.gate.authorize(bearer).await?;
        let articles = self.articles.clone();
        let invalidation = self.invalidation.clone();

        run_detached(async move {
            let article = articles.update(id, &patch, &ctx).await?;
            invalidation.after_write(Mutation::Updated(id)).await;
            Ok(article)
        })
        .await
    }

    /// Delete an article owned by the bearer
    #[instrument(skip(self, bearer))]
    pub async fn delete_article(&self, id: ArticleId, bearer: Option<&str>) -> Result<(), CoreError> {
        let ctx = self.gate.authorize(bearer).await?;
        let articles = self.articles.clone();
        let invalidation = self.invalidation.clone();

        run_detached(async move {
            articles.delete(id, &ctx).await?;
            invalidation.after_write(Mutation::Deleted(id)).await;
            Ok(())
        })
        .await
    }

    /// Number of writes whose cache clear gave up since startup
    pub fn invalidation_failures(&self) -> u64 {
        self.invalidation.failure_count()
    }
}

/// Run a write and its invalidation to completion even if the caller is dropped
async fn run_detached<T, F>(write: F) -> Result<T, CoreError>
where
    T: Send + 'static,
    F: Future<Output = Result<T, CoreError>> + Send + 'static,
{
    tokio::spawn(write.in_current_span())
        .await
        .map_err(|e| CoreError::Internal(format!("write task failed: {e}")))?
}
