//! PostgreSQL implementation of token repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::{NewToken, Token, TokenFilter, TokenPatch};
use crate::domain::repositories::TokenRepository;
use crate::error::AppError;
use crate::utils::db_error::is_foreign_key_violation;

/// PostgreSQL repository for API tokens.
///
/// Name uniqueness and the URL ownership guard are enforced by table
/// constraints, not by read-then-write checks.
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
    api_key: Uuid,
    name: String,
    is_admin: bool,
    is_blocked: bool,
    token_uses: i64,
    last_access: DateTime<Utc>,
    callback_url: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<TokenRow> for Token {
    fn from(r: TokenRow) -> Self {
        Token {
            id: r.id,
            api_key: r.api_key,
            name: r.name,
            is_admin: r.is_admin,
            is_blocked: r.is_blocked,
            token_uses: r.token_uses,
            last_access: r.last_access,
            callback_url: r.callback_url,
            created_at: r.created_at,
        }
    }
}

#[async_trait]
impl TokenRepository for PgTokenRepository {
    async fn authenticate(&self, api_key: Uuid) -> Result<Option<Token>, AppError> {
        let row = sqlx::query_as::<_, TokenRow>(
            r#"
            UPDATE tokens
            SET token_uses = token_uses + 1,
                last_access = NOW()
            WHERE api_key = $1
              AND NOT is_blocked
            RETURNING id, api_key, name, is_admin, is_blocked, token_uses,
                      last_access, callback_url, created_at
            "#,
        )
        .bind(api_key)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Token::from))
    }

    async fn create(&self, new_token: NewToken) -> Result<Option<Token>, AppError> {
        let row = sqlx::query_as::<_, TokenRow>(
            r#"
            INSERT INTO tokens (api_key, name, is_admin, is_blocked, callback_url)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (name) DO NOTHING
            RETURNING id, api_key, name, is_admin, is_blocked, token_uses,
                      last_access, callback_url, created_at
            "#,
        )
        .bind(new_token.api_key)
        .bind(&new_token.name)
        .bind(new_token.is_admin)
        .bind(new_token.is_blocked)
        .bind(&new_token.callback_url)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Token::from))
    }

    async fn find_by_api_key(&self, api_key: Uuid) -> Result<Option<Token>, AppError> {
        let row = sqlx::query_as::<_, TokenRow>(
            r#"
            SELECT id, api_key, name, is_admin, is_blocked, token_uses,
                   last_access, callback_url, created_at
            FROM tokens
            WHERE api_key = $1
            "#,
        )
        .bind(api_key)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Token::from))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Token>, AppError> {
        let row = sqlx::query_as::<_, TokenRow>(
            r#"
            SELECT id, api_key, name, is_admin, is_blocked, token_uses,
                   last_access, callback_url, created_at
            FROM tokens
            WHERE name = $1
            "#,
        )
        .bind(name)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Token::from))
    }

    async fn list(&self, filter: &TokenFilter) -> Result<Vec<Token>, AppError> {
        let rows = sqlx::query_as::<_, TokenRow>(
            r#"
            SELECT id, api_key, name, is_admin, is_blocked, token_uses,
                   last_access, callback_url, created_at
            FROM tokens
            WHERE ($1::text IS NULL OR name = $1)
              AND ($2::boolean IS NULL OR is_admin = $2)
              AND ($3::boolean IS NULL OR is_blocked = $3)
              AND ($4::text IS NULL OR callback_url = $4)
            ORDER BY id
            "#,
        )
        .bind(&filter.name)
        .bind(filter.is_admin)
        .bind(filter.is_blocked)
        .bind(&filter.callback_url)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(Token::from).collect())
    }

    async fn update(&self, api_key: Uuid, patch: TokenPatch) -> Result<Option<Token>, AppError> {
        let set_callback = patch.callback_url.is_some();
        let callback_url = patch.callback_url.flatten();

        let row = sqlx::query_as::<_, TokenRow>(
            r#"
            UPDATE tokens
            SET is_admin = COALESCE($2, is_admin),
                is_blocked = COALESCE($3, is_blocked),
                callback_url = CASE WHEN $4::boolean THEN $5::text ELSE callback_url END
            WHERE api_key = $1
            RETURNING id, api_key, name, is_admin, is_blocked, token_uses,
                      last_access, callback_url, created_at
            "#,
        )
        .bind(api_key)
        .bind(patch.is_admin)
        .bind(patch.is_blocked)
        .bind(set_callback)
        .bind(callback_url)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Token::from))
    }

    async fn delete(&self, api_key: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM tokens WHERE api_key = $1")
            .bind(api_key)
            .execute(self.pool.as_ref())
            .await
            .map_err(|e| {
                if is_foreign_key_violation(&e) {
                    AppError::conflict(
                        "There are URLs associated with the token specified for deletion",
                        &["api_key"],
                    )
                } else {
                    AppError::from(e)
                }
            })?;

        Ok(result.rows_affected() > 0)
    }
}
