//! Repository traits
//!
//! Define async repository interfaces for database operations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use folio_types::ArticleFilter;
use uuid::Uuid;

use crate::error::DbResult;
use crate::models::*;

/// Principal repository trait
#[async_trait]
pub trait PrincipalRepository: Send + Sync {
    /// Find a principal by ID
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<PrincipalRow>>;

    /// Find a principal by email
    async fn find_by_email(&self, email: &str) -> DbResult<Option<PrincipalRow>>;

    /// Create a new principal.
    ///
    /// Fails with [`crate::DbError::Conflict`] when the email is taken.
    async fn create(&self, principal: CreatePrincipal) -> DbResult<PrincipalRow>;
}

/// Create principal input
#[derive(Debug, Clone)]
pub struct CreatePrincipal {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub name: String,
}

/// Article repository trait
#[async_trait]
pub trait ArticleRepository: Send + Sync {
    /// Find an article by ID
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<ArticleRow>>;

    /// Find one page of articles and the total match count.
    ///
    /// Ordered by `published_at` descending with unpublished articles last,
    /// ties broken by ascending id. `published_after` is inclusive.
    async fn find_page(&self, filter: &ArticleFilter) -> DbResult<(Vec<ArticleListRow>, u64)>;

    /// Create a new article
    async fn create(&self, article: CreateArticle) -> DbResult<ArticleRow>;

    /// Overwrite the mutable fields of an article.
    ///
    /// Fails with [`crate::DbError::NotFound`] when the article is gone.
    async fn update(&self, article: UpdateArticle) -> DbResult<ArticleRow>;

    /// Delete an article, returning whether a row was removed
    async fn delete(&self, id: Uuid) -> DbResult<bool>;
}

/// Create article input
#[derive(Debug, Clone)]
pub struct CreateArticle {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub author_id: Uuid,
}

/// Update article input (full replacement of mutable fields)
#[derive(Debug, Clone)]
pub struct UpdateArticle {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
}
