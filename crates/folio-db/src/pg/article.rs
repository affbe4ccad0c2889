//! PostgreSQL article repository implementation

use async_trait::async_trait;
use folio_types::ArticleFilter;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::models::{ArticleListRow, ArticleRow};
use crate::repo::{ArticleRepository, CreateArticle, UpdateArticle};

/// PostgreSQL article repository
#[derive(Clone)]
pub struct PgArticleRepository {
    pool: PgPool,
}

impl PgArticleRepository {
    /// Create a new article repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Append the WHERE clause shared by the page and count queries
fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &ArticleFilter) {
    let mut clause = " WHERE ";
    if let Some(owner) = filter.owner_id() {
        builder.push(clause).push("a.author_id = ").push_bind(owner.0);
        clause = " AND ";
    }
    if let Some(after) = filter.published_after() {
        builder.push(clause).push("a.published_at >= ").push_bind(after);
    }
}

fn page_query(filter: &ArticleFilter) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(
        "SELECT a.id, a.title, a.description, a.published_at, a.author_id, \
         p.email AS author_email, p.name AS author_name \
         FROM articles a JOIN principals p ON p.id = a.author_id",
    );
    push_filters(&mut builder, filter);
    builder
        .push(" ORDER BY a.published_at DESC NULLS LAST, a.id ASC LIMIT ")
        .push_bind(i64::try_from(filter.limit()).unwrap_or(i64::MAX))
        .push(" OFFSET ")
        .push_bind(i64::try_from(filter.offset()).unwrap_or(i64::MAX));
    builder
}

fn count_query(filter: &ArticleFilter) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM articles a");
    push_filters(&mut builder, filter);
    builder
}

#[async_trait]
impl ArticleRepository for PgArticleRepository {
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<ArticleRow>> {
        let article = sqlx::query_as::<_, ArticleRow>(
            r#"
            SELECT id, title, description, published_at, author_id
            FROM articles
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(article)
    }

    async fn find_page(&self, filter: &ArticleFilter) -> DbResult<(Vec<ArticleListRow>, u64)> {
        let items = page_query(filter)
            .build_query_as::<ArticleListRow>()
            .fetch_all(&self.pool)
            .await?;

        let total: i64 = count_query(filter)
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        Ok((items, u64::try_from(total).unwrap_or(0)))
    }

    async fn create(&self, article: CreateArticle) -> DbResult<ArticleRow> {
        let row = sqlx::query_as::<_, ArticleRow>(
            r#"
            INSERT INTO articles (id, title, description, published_at, author_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, title, description, published_at, author_id
            "#,
        )
        .bind(article.id)
        .bind(&article.title)
        .bind(&article.description)
        .bind(article.published_at)
        .bind(article.author_id)
        .fetch_one(&self.pool)
        .await
        .map_err(DbError::from_insert)?;

        Ok(row)
    }

    async fn update(&self, article: UpdateArticle) -> DbResult<ArticleRow> {
        let row = sqlx::query_as::<_, ArticleRow>(
            r#"
            UPDATE articles
            SET title = $2, description = $3, published_at = $4
            WHERE id = $1
            RETURNING id, title, description, published_at, author_id
            "#,
        )
        .bind(article.id)
        .bind(&article.title)
        .bind(&article.description)
        .bind(article.published_at)
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or(DbError::NotFound)
    }

    async fn delete(&self, id: Uuid) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM articles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
