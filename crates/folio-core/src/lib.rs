//! Folio Core - article listing business logic
//!
//! Registration and login, session tokens, the authorization gate,
//! ownership-scoped article writes and the cache-aside listing layer.
//!
//! # Example
//!
//! ```rust,ignore
//! use folio_core::{CoreConfig, FolioService, MokaQueryCache};
//!
//! let config = CoreConfig::try_new(secret)?;
//! let cache = Arc::new(MokaQueryCache::new(config.cache_max_entries));
//! let service = FolioService::new(config, principals, articles, cache)?;
//!
//! service.register("a@x.com", "secret1", "Ann").await?;
//! let login = service.authenticate("a@x.com", "secret1").await?;
//! let article = service
//!     .create_article(NewArticle::titled("T1"), Some(&login.token.token))
//!     .await?;
//! ```

pub mod articles;
pub mod cache;
pub mod clock;
pub mod config;
pub mod crypto;
pub mod error;
pub mod gate;
pub mod identity;
pub mod invalidation;
pub mod metrics;
pub mod service;
pub mod token;

pub use articles::ArticleStore;
pub use cache::{cache_key, CacheError, CacheGeneration, CachedArticleQuery, MokaQueryCache, QueryCache, ARTICLE_LIST_NAMESPACE};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::CoreConfig;
pub use crypto::{Argon2Hasher, CredentialHasher};
pub use error::CoreError;
pub use gate::{ensure_owner, AuthContext, AuthorizationGate};
pub use identity::IdentityStore;
pub use invalidation::{InvalidationCoordinator, InvalidationOutcome, Mutation};
pub use service::{FolioService, LoginResult};
pub use token::{IssuedToken, TokenClaims, TokenIssuer};
