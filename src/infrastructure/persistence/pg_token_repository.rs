//! PostgreSQL implementation of token repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::repositories::{ApiToken, TokenRepository};
use crate::error::AppError;

/// PostgreSQL repository for API token storage and validation.
///
/// Stores HMAC hashes of tokens. Raw tokens are never persisted.
pub struct PgTokenRepository {
    pool: Arc<PgPool>,
}

impl PgTokenRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct TokenRow {
    id: i64,
    name: String,
    owner_id: String,
    token_hash: String,
    created_at: DateTime<Utc>,
    last_used_at: Option<DateTime<Utc>>,
    revoked_at: Option<DateTime<Utc>>,
}

impl From<TokenRow> for ApiToken {
    fn from(r: TokenRow) -> Self {
        ApiToken {
            id: r.id,
            name: r.name,
            owner_id: r.owner_id,
            token_hash: r.token_hash,
            created_at: r.created_at,
            last_used_at: r.last_used_at,
            revoked_at: r.revoked_at,
        }
    }
}

#[async_trait]
impl TokenRepository for PgTokenRepository {
    async fn find_owner(&self, token_hash: &str) -> Result<Option<String>, AppError> {
        let owner = sqlx::query_scalar::<_, String>(
            r#"
            SELECT owner_id
            FROM api_tokens
            WHERE token_hash = $1
              AND revoked_at IS NULL
            "#,
        )
        .bind(token_hash)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(owner)
    }

    async fn update_last_used(&self, token_hash: &str) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE api_tokens
            SET last_used_at = NOW()
            WHERE token_hash = $1
              AND revoked_at IS NULL
            "#,
        )
        .bind(token_hash)
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn create_token(
        &self,
        name: &str,
        owner_id: &str,
        token_hash: &str,
    ) -> Result<ApiToken, AppError> {
        let row = sqlx::query_as::<_, TokenRow>(
            r#"
            INSERT INTO api_tokens (name, owner_id, token_hash)
            VALUES ($1, $2, $3)
            RETURNING id, name, owner_id, token_hash, created_at, last_used_at, revoked_at
            "#,
        )
        .bind(name)
        .bind(owner_id)
        .bind(token_hash)
        .fetch_one(self.pool.as_ref())
        .await
        .map_err(|e| {
            if let Some(db) = e.as_database_error()
                && db.is_unique_violation()
            {
                return AppError::conflict(
                    "Token already exists",
                    json!({ "constraint": db.constraint() }),
                );
            }
            AppError::from(e)
        })?;

        Ok(row.into())
    }

    async fn list_tokens(&self) -> Result<Vec<ApiToken>, AppError> {
        let rows = sqlx::query_as::<_, TokenRow>(
            r#"
            SELECT id, name, owner_id, token_hash, created_at, last_used_at, revoked_at
            FROM api_tokens
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(ApiToken::from).collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<ApiToken>, AppError> {
        let row = sqlx::query_as::<_, TokenRow>(
            r#"
            SELECT id, name, owner_id, token_hash, created_at, last_used_at, revoked_at
            FROM api_tokens
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(ApiToken::from))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<ApiToken>, AppError> {
        let row = sqlx::query_as::<_, TokenRow>(
            r#"
            SELECT id, name, owner_id, token_hash, created_at, last_used_at, revoked_at
            FROM api_tokens
            WHERE name = $1
            "#,
        )
        .bind(name)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(ApiToken::from))
    }

    async fn revoke_token(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE api_tokens
            SET revoked_at = NOW()
            WHERE id = $1 AND revoked_at IS NULL
            "#,
        )
        .bind(id)
        .execute(self.pool.as_ref())
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(
                "Token not found or already revoked",
                json!({ "id": id }),
            ));
        }

        Ok(())
    }
}
