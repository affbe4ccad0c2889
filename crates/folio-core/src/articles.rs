//! Article store - ownership-scoped persistence of articles

use std::sync::Arc;

use folio_db::{ArticleRepository, CreateArticle, DbError, UpdateArticle};
use folio_types::{Article, ArticleFilter, ArticleId, ArticlePage, ArticlePatch, NewArticle, PrincipalId};
use uuid::Uuid;

use crate::gate::ensure_owner;
use crate::{AuthContext, CoreError};

/// Durable registry of articles, each owned by one principal
pub struct ArticleStore<A: ArticleRepository + ?Sized> {
    repo: Arc<A>,
}

impl<A: ArticleRepository + ?Sized> Clone for ArticleStore<A> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
        }
    }
}

impl<A: ArticleRepository + ?Sized> ArticleStore<A> {
    pub fn new(repo: Arc<A>) -> Self {
        Self { repo }
    }

    /// Create an article owned by `owner_id`
    pub async fn create(
        &self,
        fields: NewArticle,
        owner_id: PrincipalId,
    ) -> Result<Article, CoreError> {
        fields.validate()?;

        let row = self
            .repo
            .create(CreateArticle {
                id: Uuid::new_v4(),
                title: fields.title,
                description: fields.description,
                published_at: fields.published_at,
                author_id: owner_id.0,
            })
            .await?;

        tracing::info!(article_id = %row.id, owner = %owner_id, "Created article");
        Ok(row.into())
    }

    /// Get an article by ID
    pub async fn find_by_id(&self, id: ArticleId) -> Result<Article, CoreError> {
        self.repo
            .find_by_id(id.0)
            .await?
            .map(Article::from)
            .ok_or(CoreError::NotFound)
    }

    /// Query one page straight from the repository
    pub async fn find_page(&self, filter: &ArticleFilter) -> Result<ArticlePage, CoreError> {
        let (rows, total) = self.repo.find_page(filter).await?;
        let items = rows.into_iter().map(Article::from).collect();
        Ok(ArticlePage::new(items, total, filter))
    }

    /// Apply a partial update on behalf of `caller`
    pub async fn update(
        &self,
        id: ArticleId,
        patch: &ArticlePatch,
        caller: &AuthContext,
    ) -> Result<Article, CoreError> {
        patch.validate()?;

        let mut article = self.find_by_id(id).await?;
        ensure_owner(caller, article.author_id)?;

        if patch.is_empty() {
            return Ok(article);
        }
        patch.apply_to(&mut article);

        let row = self
            .repo
            .update(UpdateArticle {
                id: id.0,
                title: article.title,
                description: article.description,
                published_at: article.published_at,
            })
            .await?;

        tracing::info!(article_id = %id, "Updated article");
        Ok(row.into())
    }

    /// Delete an article on behalf of `caller`
    pub async fn delete(&self, id: ArticleId, caller: &AuthContext) -> Result<(), CoreError> {
        let article = self.find_by_id(id).await?;
        ensure_owner(caller, article.author_id)?;

        // A concurrent delete may have removed the row after the lookup
        if !self.repo.delete(id.0).await? {
            return Err(DbError::NotFound.into());
        }

        tracing::info!(article_id = %id, "Deleted article");
        Ok(())
    }
}
