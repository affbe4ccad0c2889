//! PostgreSQL principal repository implementation

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::models::PrincipalRow;
use crate::repo::{CreatePrincipal, PrincipalRepository};

/// PostgreSQL principal repository
#[derive(Clone)]
pub struct PgPrincipalRepository {
    pool: PgPool,
}

impl PgPrincipalRepository {
    /// Create a new principal repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PrincipalRepository for PgPrincipalRepository {
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<PrincipalRow>> {
        let principal = sqlx::query_as::<_, PrincipalRow>(
            r#"
            SELECT id, email, password_hash, name, created_at
            FROM principals
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(principal)
    }

    async fn find_by_email(&self, email: &str) -> DbResult<Option<PrincipalRow>> {
        let principal = sqlx::query_as::<_, PrincipalRow>(
            r#"
            SELECT id, email, password_hash, name, created_at
            FROM principals
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(principal)
    }

    async fn create(&self, principal: CreatePrincipal) -> DbResult<PrincipalRow> {
        let row = sqlx::query_as::<_, PrincipalRow>(
            r#"
            INSERT INTO principals (id, email, password_hash, name)
            VALUES ($1, $2, $3, $4)
            RETURNING id, email, password_hash, name, created_at
            "#,
        )
        .bind(principal.id)
        .bind(&principal.email)
        .bind(&principal.password_hash)
        .bind(&principal.name)
        .fetch_one(&self.pool)
        .await
        .map_err(DbError::from_insert)?;

        Ok(row)
    }
}
