//! PostgreSQL implementation of link repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;
use std::sync::Arc;

use crate::domain::entities::{Link, LinkFilter, LinkPatch, Meta, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

/// PostgreSQL repository for link storage and retrieval.
///
/// Every read joins `tokens` to expose the owner's name. Metadata lives in a
/// JSONB column and is filtered with the `@>` containment operator.
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
    shortcut: String,
    url: String,
    is_custom: bool,
    meta: Json<Meta>,
    token_id: i64,
    owner: String,
    created_at: DateTime<Utc>,
}

impl From<LinkRow> for Link {
    fn from(r: LinkRow) -> Self {
        Link {
            id: r.id,
            shortcut: r.shortcut,
            url: r.url,
            is_custom: r.is_custom,
            meta: r.meta.0,
            token_id: r.token_id,
            owner: r.owner,
            created_at: r.created_at,
        }
    }
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn try_create(&self, new_link: NewLink) -> Result<Option<Link>, AppError> {
        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            WITH inserted AS (
                INSERT INTO urls (shortcut, url, is_custom, meta, token_id)
                VALUES ($1, $2, $3, $4, $5)
                ON CONFLICT (shortcut) DO NOTHING
                RETURNING id, shortcut, url, is_custom, meta, token_id, created_at
            )
            SELECT i.id, i.shortcut, i.url, i.is_custom, i.meta, i.token_id,
                   t.name AS owner, i.created_at
            FROM inserted i
            JOIN tokens t ON t.id = i.token_id
            "#,
        )
        .bind(&new_link.shortcut)
        .bind(&new_link.url)
        .bind(new_link.is_custom)
        .bind(Json(&new_link.meta))
        .bind(new_link.token_id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Link::from))
    }

    async fn find_by_shortcut(&self, shortcut: &str) -> Result<Option<Link>, AppError> {
        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            SELECT l.id, l.shortcut, l.url, l.is_custom, l.meta, l.token_id,
                   t.name AS owner, l.created_at
            FROM urls l
            JOIN tokens t ON t.id = l.token_id
            WHERE l.shortcut = $1
            "#,
        )
        .bind(shortcut)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Link::from))
    }

    async fn find_reusable(&self, url: &str) -> Result<Option<Link>, AppError> {
        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            SELECT l.id, l.shortcut, l.url, l.is_custom, l.meta, l.token_id,
                   t.name AS owner, l.created_at
            FROM urls l
            JOIN tokens t ON t.id = l.token_id
            WHERE l.url = $1
              AND NOT l.is_custom
            ORDER BY l.id
            LIMIT 1
            "#,
        )
        .bind(url)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Link::from))
    }

    async fn find_target(&self, shortcut: &str) -> Result<Option<String>, AppError> {
        let url = sqlx::query_scalar::<_, String>("SELECT url FROM urls WHERE shortcut = $1")
            .bind(shortcut)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(url)
    }

    async fn list(&self, filter: &LinkFilter) -> Result<Vec<Link>, AppError> {
        let rows = sqlx::query_as::<_, LinkRow>(
            r#"
            SELECT l.id, l.shortcut, l.url, l.is_custom, l.meta, l.token_id,
                   t.name AS owner, l.created_at
            FROM urls l
            JOIN tokens t ON t.id = l.token_id
            WHERE ($1::bigint IS NULL OR l.token_id = $1)
              AND ($2::text IS NULL OR l.url = $2)
              AND l.meta @> $3::jsonb
            ORDER BY l.created_at DESC, l.id DESC
            "#,
        )
        .bind(filter.token_id)
        .bind(&filter.url)
        .bind(Json(&filter.meta))
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(Link::from).collect())
    }

    async fn update(&self, shortcut: &str, patch: LinkPatch) -> Result<Option<Link>, AppError> {
        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            WITH updated AS (
                UPDATE urls
                SET url = COALESCE($2, url),
                    meta = COALESCE($3::jsonb, meta)
                WHERE shortcut = $1
                RETURNING id, shortcut, url, is_custom, meta, token_id, created_at
            )
            SELECT u.id, u.shortcut, u.url, u.is_custom, u.meta, u.token_id,
                   t.name AS owner, u.created_at
            FROM updated u
            JOIN tokens t ON t.id = u.token_id
            "#,
        )
        .bind(shortcut)
        .bind(patch.url)
        .bind(patch.meta.map(Json))
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Link::from))
    }

    async fn delete(&self, shortcut: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM urls WHERE shortcut = $1")
            .bind(shortcut)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
