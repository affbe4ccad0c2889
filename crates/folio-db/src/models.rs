//! Database row models
//!
//! These types map directly to database rows using SQLx's FromRow derive.

use chrono::{DateTime, Utc};
use folio_types::{Article, ArticleAuthor, ArticleId, Principal, PrincipalId};
use sqlx::FromRow;
use uuid::Uuid;

/// Principal row from the database
#[derive(Debug, Clone, FromRow)]
pub struct PrincipalRow {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Article row from the database
#[derive(Debug, Clone, FromRow)]
pub struct ArticleRow {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub author_id: Uuid,
}

/// Article row joined with its author
#[derive(Debug, Clone, FromRow)]
pub struct ArticleListRow {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub author_id: Uuid,
    pub author_email: String,
    pub author_name: String,
}

impl PrincipalRow {
    /// Convert to the domain type, dropping the password hash
    pub fn into_principal(self) -> Principal {
        Principal {
            id: PrincipalId(self.id),
            email: self.email,
            name: self.name,
            created_at: self.created_at,
        }
    }
}

impl From<ArticleRow> for Article {
    fn from(row: ArticleRow) -> Self {
        Self {
            id: ArticleId(row.id),
            title: row.title,
            description: row.description,
            published_at: row.published_at,
            author_id: PrincipalId(row.author_id),
            author: None,
        }
    }
}

impl From<ArticleListRow> for Article {
    fn from(row: ArticleListRow) -> Self {
        Self {
            id: ArticleId(row.id),
            title: row.title,
            description: row.description,
            published_at: row.published_at,
            author_id: PrincipalId(row.author_id),
            author: Some(ArticleAuthor {
                id: PrincipalId(row.author_id),
                email: row.author_email,
                name: row.author_name,
            }),
        }
    }
}
