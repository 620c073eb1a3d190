//! PostgreSQL implementation of link repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{Link, LinkChanges, NewLink, UpdatedLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

/// PostgreSQL repository for link storage and retrieval.
///
/// Short-code uniqueness rests on the `links_short_code_key` constraint; a
/// violation surfaces as [`AppError::Conflict`] through `From<sqlx::Error>`.
/// Update and delete carry `owner_id` in their `WHERE` clause so the ownership
/// check and the mutation are one statement.
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
}

impl PgLinkRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct LinkRow {
    id: i64,
    owner_id: String,
    short_code: String,
    url: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<LinkRow> for Link {
    fn from(r: LinkRow) -> Self {
        Link::new(
            r.id,
            r.owner_id,
            r.short_code,
            r.url,
            r.created_at,
            r.updated_at,
        )
    }
}

#[derive(sqlx::FromRow)]
struct UpdatedLinkRow {
    #[sqlx(flatten)]
    link: LinkRow,
    previous_short_code: String,
}

impl From<UpdatedLinkRow> for UpdatedLink {
    fn from(r: UpdatedLinkRow) -> Self {
        UpdatedLink {
            link: r.link.into(),
            previous_short_code: r.previous_short_code,
        }
    }
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError> {
        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            INSERT INTO links (owner_id, short_code, url)
            VALUES ($1, $2, $3)
            RETURNING id, owner_id, short_code, url, created_at, updated_at
            "#,
        )
        .bind(&new_link.owner_id)
        .bind(&new_link.short_code)
        .bind(&new_link.url)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row.into())
    }

    async fn find_by_id(&self, id: i64, owner_id: &str) -> Result<Option<Link>, AppError> {
        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            SELECT id, owner_id, short_code, url, created_at, updated_at
            FROM links
            WHERE id = $1 AND owner_id = $2
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Link::from))
    }

    async fn find_by_code(&self, short_code: &str) -> Result<Option<Link>, AppError> {
        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            SELECT id, owner_id, short_code, url, created_at, updated_at
            FROM links
            WHERE short_code = $1
            "#,
        )
        .bind(short_code)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Link::from))
    }

    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Link>, AppError> {
        // Unbounded: the owner listing has no pagination yet.
        let rows = sqlx::query_as::<_, LinkRow>(
            r#"
            SELECT id, owner_id, short_code, url, created_at, updated_at
            FROM links
            WHERE owner_id = $1
            ORDER BY updated_at DESC, id DESC
            "#,
        )
        .bind(owner_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(Link::from).collect())
    }

    async fn update(
        &self,
        id: i64,
        owner_id: &str,
        changes: LinkChanges,
    ) -> Result<Option<UpdatedLink>, AppError> {
        // The locking read waits out a concurrent rename, so the code returned
        // as previous is the one this write actually replaces.
        // updated_at must advance even inside a long transaction.
        let row = sqlx::query_as::<_, UpdatedLinkRow>(
            r#"
            WITH prev AS (
                SELECT id, short_code
                FROM links
                WHERE id = $1 AND owner_id = $2
                FOR UPDATE
            )
            UPDATE links SET
                short_code = $3,
                url        = $4,
                updated_at = clock_timestamp()
            FROM prev
            WHERE links.id = prev.id
            RETURNING links.id, links.owner_id, links.short_code, links.url,
                      links.created_at, links.updated_at,
                      prev.short_code AS previous_short_code
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .bind(&changes.short_code)
        .bind(&changes.url)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(UpdatedLink::from))
    }

    async fn delete(&self, id: i64, owner_id: &str) -> Result<Option<Link>, AppError> {
        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            DELETE FROM links
            WHERE id = $1 AND owner_id = $2
            RETURNING id, owner_id, short_code, url, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Link::from))
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(self.pool.as_ref())
            .await?;
        Ok(())
    }
}
