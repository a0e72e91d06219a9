//! Repository trait for API token storage and authentication.

use crate::domain::entities::{NewToken, Token, TokenFilter, TokenPatch};
use crate::error::AppError;
use async_trait::async_trait;
use uuid::Uuid;

/// Repository interface for API token management.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgTokenRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
///
/// # Examples
///
/// See integration tests: `tests/repository_token.rs`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Accepts a credential and records its use.
    ///
    /// For an existing, non-blocked token this atomically increments
    /// `token_uses`, sets `last_access` to now and returns the updated token.
    /// Unknown and blocked keys return `Ok(None)` and are left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn authenticate(&self, api_key: Uuid) -> Result<Option<Token>, AppError>;

    /// Inserts a new token.
    ///
    /// Returns `Ok(None)` if the name is already taken. Two concurrent inserts
    /// with the same name resolve to exactly one `Some`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn create(&self, new_token: NewToken) -> Result<Option<Token>, AppError>;

    /// Finds a token by its API key.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_by_api_key(&self, api_key: Uuid) -> Result<Option<Token>, AppError>;

    /// Finds a token by its name.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_by_name(&self, name: &str) -> Result<Option<Token>, AppError>;

    /// Lists tokens matching every provided field of `filter`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn list(&self, filter: &TokenFilter) -> Result<Vec<Token>, AppError>;

    /// Applies `patch` to the token with `api_key`.
    ///
    /// Returns `Ok(None)` if no such token exists.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn update(&self, api_key: Uuid, patch: TokenPatch) -> Result<Option<Token>, AppError>;

    /// Deletes the token with `api_key`.
    ///
    /// Returns `Ok(false)` if no such token exists.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the token still owns URLs.
    /// Returns [`AppError::Internal`] on database errors.
    async fn delete(&self, api_key: Uuid) -> Result<bool, AppError>;
}
