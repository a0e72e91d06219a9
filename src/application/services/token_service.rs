//! Token management service.

use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::{NewToken, Token, TokenFilter, TokenPatch};
use crate::domain::repositories::TokenRepository;
use crate::error::AppError;

/// Service for creating and administering API tokens.
///
/// Tokens are addressed by their API key as received on the wire. A key that
/// is not a valid UUID cannot exist and is reported as not found.
pub struct TokenService<R: TokenRepository> {
    repository: Arc<R>,
}

impl<R: TokenRepository> TokenService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Creates a token with a freshly generated API key.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::MissingArgs`] if `name` is blank.
    /// Returns [`AppError::Conflict`] if `name` is taken.
    pub async fn create(
        &self,
        name: String,
        is_admin: bool,
        is_blocked: bool,
        callback_url: Option<String>,
    ) -> Result<Token, AppError> {
        if name.trim().is_empty() {
            return Err(AppError::missing_args(
                "New tokens need to mention the \"name\" attribute",
                &["name"],
            ));
        }

        let new_token = NewToken {
            api_key: Uuid::new_v4(),
            name,
            is_admin,
            is_blocked,
            callback_url,
        };
        let name = new_token.name.clone();

        match self.repository.create(new_token).await? {
            Some(token) => {
                tracing::info!(token = %token.name, role = token.role(), "token created");
                Ok(token)
            }
            None => {
                tracing::debug!(%name, "token name already taken");
                Err(AppError::conflict("Token with name exists", &["name"]))
            }
        }
    }

    /// Retrieves a token by API key.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no such token exists.
    pub async fn get(&self, api_key: &str) -> Result<Token, AppError> {
        let api_key = parse_api_key(api_key)?;

        self.repository
            .find_by_api_key(api_key)
            .await?
            .ok_or_else(api_key_not_found)
    }

    pub async fn list(&self, filter: &TokenFilter) -> Result<Vec<Token>, AppError> {
        self.repository.list(filter).await
    }

    /// Applies a patch to a token.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no such token exists.
    pub async fn update(&self, api_key: &str, patch: TokenPatch) -> Result<Token, AppError> {
        let api_key = parse_api_key(api_key)?;

        let token = self
            .repository
            .update(api_key, patch)
            .await?
            .ok_or_else(api_key_not_found)?;

        tracing::info!(
            token = %token.name,
            is_admin = token.is_admin,
            is_blocked = token.is_blocked,
            "token updated"
        );
        Ok(token)
    }

    /// Deletes a token.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no such token exists.
    /// Returns [`AppError::Conflict`] if the token still owns URLs.
    pub async fn delete(&self, api_key: &str) -> Result<(), AppError> {
        let parsed = parse_api_key(api_key)?;

        if !self.repository.delete(parsed).await? {
            return Err(api_key_not_found());
        }

        tracing::info!(api_key = %parsed, "token deleted");
        Ok(())
    }
}

fn parse_api_key(api_key: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(api_key).map_err(|_| api_key_not_found())
}

fn api_key_not_found() -> AppError {
    AppError::not_found("API key does not exist", &["api_key"])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockTokenRepository;
    use chrono::Utc;

    fn create_test_token(name: &str, is_admin: bool) -> Token {
        Token {
            id: 7,
            api_key: Uuid::new_v4(),
            name: name.to_string(),
            is_admin,
            is_blocked: false,
            token_uses: 0,
            last_access: Utc::now(),
            callback_url: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_create_token_success() {
        let mut mock_repo = MockTokenRepository::new();

        mock_repo
            .expect_create()
            .withf(|t| t.name == "bob" && !t.is_admin && t.callback_url.is_none())
            .times(1)
            .returning(|t| {
                let mut token = create_test_token(&t.name, t.is_admin);
                token.api_key = t.api_key;
                Ok(Some(token))
            });

        let service = TokenService::new(Arc::new(mock_repo));

        let token = service
            .create("bob".to_string(), false, false, None)
            .await
            .unwrap();

        assert_eq!(token.name, "bob");
        assert!(!token.api_key.is_nil());
    }

    #[tokio::test]
    async fn test_create_token_name_taken() {
        let mut mock_repo = MockTokenRepository::new();

        mock_repo
            .expect_create()
            .times(1)
            .returning(|_| Ok(None));

        let service = TokenService::new(Arc::new(mock_repo));

        let err = service
            .create("bob".to_string(), false, false, None)
            .await
            .unwrap_err();

        match err {
            AppError::Conflict { message, args } => {
                assert_eq!(message, "Token with name exists");
                assert_eq!(args, vec!["name"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_token_blank_name() {
        let mut mock_repo = MockTokenRepository::new();
        mock_repo.expect_create().times(0);

        let service = TokenService::new(Arc::new(mock_repo));

        let err = service
            .create("   ".to_string(), false, false, None)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::MissingArgs { .. }));
    }

    #[tokio::test]
    async fn test_get_token_with_malformed_key_is_not_found() {
        let mut mock_repo = MockTokenRepository::new();
        mock_repo.expect_find_by_api_key().times(0);

        let service = TokenService::new(Arc::new(mock_repo));

        let err = service.get("definitely-not-a-uuid").await.unwrap_err();

        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_get_token_missing() {
        let mut mock_repo = MockTokenRepository::new();

        mock_repo
            .expect_find_by_api_key()
            .times(1)
            .returning(|_| Ok(None));

        let service = TokenService::new(Arc::new(mock_repo));

        let err = service.get(&Uuid::new_v4().to_string()).await.unwrap_err();

        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_update_token_passes_patch_through() {
        let mut mock_repo = MockTokenRepository::new();

        mock_repo
            .expect_update()
            .withf(|_, patch| {
                patch.is_blocked == Some(true)
                    && patch.is_admin.is_none()
                    && patch.callback_url == Some(None)
            })
            .times(1)
            .returning(|_, _| {
                let mut token = create_test_token("bob", false);
                token.is_blocked = true;
                Ok(Some(token))
            });

        let service = TokenService::new(Arc::new(mock_repo));

        let patch = TokenPatch {
            is_admin: None,
            is_blocked: Some(true),
            callback_url: Some(None),
        };
        let token = service
            .update(&Uuid::new_v4().to_string(), patch)
            .await
            .unwrap();

        assert!(token.is_blocked);
    }

    #[tokio::test]
    async fn test_delete_token_missing() {
        let mut mock_repo = MockTokenRepository::new();

        mock_repo
            .expect_delete()
            .times(1)
            .returning(|_| Ok(false));

        let service = TokenService::new(Arc::new(mock_repo));

        let err = service
            .delete(&Uuid::new_v4().to_string())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_token_owning_urls_conflicts() {
        let mut mock_repo = MockTokenRepository::new();

        mock_repo.expect_delete().times(1).returning(|_| {
            Err(AppError::conflict(
                "There are URLs associated with the token specified for deletion",
                &["api_key"],
            ))
        });

        let service = TokenService::new(Arc::new(mock_repo));

        let err = service
            .delete(&Uuid::new_v4().to_string())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Conflict { .. }));
    }
}
