//! Repository trait for shortcut data access.

use crate::domain::entities::{Link, LinkFilter, LinkPatch, NewLink};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for managing links.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
///
/// # Examples
///
/// See integration tests: `tests/repository_link.rs`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Inserts a new link unless its shortcut is taken.
    ///
    /// Uniqueness is enforced by the `urls_shortcut_key` constraint, so of
    /// two racing inserts for one shortcut exactly one returns `Some`.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Link))` if inserted
    /// - `Ok(None)` if the shortcut already exists
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn try_create(&self, new_link: NewLink) -> Result<Option<Link>, AppError>;

    /// Finds a link by its shortcut.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_by_shortcut(&self, shortcut: &str) -> Result<Option<Link>, AppError>;

    /// Finds the oldest generated (non-custom) link pointing at `url`.
    ///
    /// Used to honour `allow_reuse` on auto-shortcut creation.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_reusable(&self, url: &str) -> Result<Option<Link>, AppError>;

    /// Returns only the target URL of a shortcut. Used by redirection.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_target(&self, shortcut: &str) -> Result<Option<String>, AppError>;

    /// Lists links matching `filter`, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn list(&self, filter: &LinkFilter) -> Result<Vec<Link>, AppError>;

    /// Partially updates a link.
    ///
    /// Returns `Ok(None)` if no link has this shortcut.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn update(&self, shortcut: &str, patch: LinkPatch) -> Result<Option<Link>, AppError>;

    /// Hard-deletes a link.
    ///
    /// Returns `Ok(false)` if no link has this shortcut.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn delete(&self, shortcut: &str) -> Result<bool, AppError>;
}
