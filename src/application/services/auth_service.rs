//! Authentication service for bearer API keys.

use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::Token;
use crate::domain::repositories::TokenRepository;
use crate::error::AppError;

/// Service resolving a raw bearer credential to a [`Token`].
///
/// A successful call also records the use on the token (`token_uses` and
/// `last_access`), in the same statement that looks it up.
pub struct AuthService<R: TokenRepository> {
    repository: Arc<R>,
}

impl<R: TokenRepository> AuthService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Authenticates a raw credential taken from the `Authorization` header.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InvalidToken`] if:
    /// - The credential is not a UUID
    /// - No token has this API key
    /// - The token is blocked
    ///
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn authenticate(&self, credential: &str) -> Result<Token, AppError> {
        let Ok(api_key) = Uuid::parse_str(credential.trim()) else {
            tracing::debug!("rejected malformed API key");
            return Err(AppError::InvalidToken);
        };

        match self.repository.authenticate(api_key).await? {
            Some(token) => {
                tracing::debug!(token = %token.name, uses = token.token_uses, "token accepted");
                Ok(token)
            }
            None => {
                tracing::info!(%api_key, "rejected unknown or blocked API key");
                Err(AppError::InvalidToken)
            }
        }
    }
}

/// Fails with [`AppError::InsufficientPermissions`] unless `token` is an admin.
pub fn require_admin(token: &Token) -> Result<(), AppError> {
    if token.is_admin {
        Ok(())
    } else {
        Err(AppError::InsufficientPermissions)
    }
}
