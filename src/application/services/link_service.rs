//! Shortcut creation, management and resolution service.

use std::sync::Arc;

use validator::ValidationError;

use crate::domain::entities::{Link, LinkFilter, LinkPatch, Meta, NewLink, Token};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::utils::shortcut::ShortcutPolicy;

/// Maximum number of generated candidates tried before giving up.
const MAX_GENERATION_ATTEMPTS: usize = 10;

/// Target and options of a URL creation request.
#[derive(Debug, Clone)]
pub struct LinkDraft {
    pub url: String,
    pub meta: Meta,
    pub allow_reuse: bool,
}

/// Service for creating, managing and resolving shortcuts.
///
/// Uniqueness is decided by the insert itself: a candidate that loses a
/// race simply comes back as `None` from the repository and the next one is
/// tried.
pub struct LinkService<L: LinkRepository> {
    repository: Arc<L>,
    policy: ShortcutPolicy,
}

impl<L: LinkRepository> LinkService<L> {
    pub fn new(repository: Arc<L>, policy: ShortcutPolicy) -> Self {
        Self { repository, policy }
    }

    /// Validates a caller-specified shortcut against alphabet, reserved
    /// routes and blacklist.
    pub fn validate_shortcut(&self, shortcut: &str) -> Result<(), ValidationError> {
        self.policy.validate_manual(shortcut)
    }

    /// Creates a URL under a generated shortcut.
    ///
    /// With `allow_reuse`, an existing generated shortcut for the same target
    /// is returned instead of creating a new one. Custom shortcuts are never
    /// reused here.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if no free shortcut was found within
    /// [`MAX_GENERATION_ATTEMPTS`] draws. That means the configured length is
    /// too small for the number of stored URLs.
    pub async fn create_generated(&self, owner: &Token, draft: LinkDraft) -> Result<Link, AppError> {
        if draft.allow_reuse
            && let Some(existing) = self.repository.find_reusable(&draft.url).await?
        {
            tracing::debug!(shortcut = %existing.shortcut, "reusing generated shortcut");
            return Ok(existing);
        }

        for attempt in 1..=MAX_GENERATION_ATTEMPTS {
            let candidate = self.policy.generate();
            if !self.policy.accepts_generated(&candidate) {
                continue;
            }

            let new_link = NewLink {
                shortcut: candidate,
                url: draft.url.clone(),
                is_custom: false,
                meta: draft.meta.clone(),
                token_id: owner.id,
            };

            if let Some(link) = self.repository.try_create(new_link).await? {
                tracing::info!(
                    shortcut = %link.shortcut,
                    owner = %owner.name,
                    "shortcut created"
                );
                return Ok(link);
            }

            tracing::debug!(attempt, "generated shortcut collided");
        }

        Err(AppError::internal(format!(
            "no free shortcut of length {} after {MAX_GENERATION_ATTEMPTS} attempts",
            self.policy.length()
        )))
    }

    /// Creates a URL under a caller-specified shortcut.
    ///
    /// A shortcut that is not stored yet must already have passed
    /// [`Self::validate_shortcut`].
    /// If the shortcut exists, it is returned only with `allow_reuse` and an
    /// identical target.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the shortcut is taken and cannot be
    /// reused.
    pub async fn create_custom(
        &self,
        owner: &Token,
        shortcut: &str,
        draft: LinkDraft,
    ) -> Result<Link, AppError> {
        if let Some(existing) = self.repository.find_by_shortcut(shortcut).await? {
            return reuse_or_conflict(existing, &draft);
        }

        let new_link = NewLink {
            shortcut: shortcut.to_string(),
            url: draft.url.clone(),
            is_custom: true,
            meta: draft.meta.clone(),
            token_id: owner.id,
        };

        if let Some(link) = self.repository.try_create(new_link).await? {
            tracing::info!(shortcut = %link.shortcut, owner = %owner.name, "custom shortcut created");
            return Ok(link);
        }

        // Lost a race against a concurrent insert of the same shortcut.
        match self.repository.find_by_shortcut(shortcut).await? {
            Some(existing) => reuse_or_conflict(existing, &draft),
            None => Err(shortcut_conflict()),
        }
    }

    /// Retrieves a URL by shortcut.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the shortcut does not exist.
    pub async fn get(&self, shortcut: &str) -> Result<Link, AppError> {
        self.repository
            .find_by_shortcut(shortcut)
            .await?
            .ok_or_else(shortcut_not_found)
    }

    /// Looks up a URL by shortcut without failing when it is absent.
    pub async fn find(&self, shortcut: &str) -> Result<Option<Link>, AppError> {
        self.repository.find_by_shortcut(shortcut).await
    }

    /// Lists URLs visible to `caller`.
    ///
    /// Non-admins, and admins without `all`, only see their own URLs.
    pub async fn list(
        &self,
        caller: &Token,
        all: bool,
        url: Option<String>,
        meta: Meta,
    ) -> Result<Vec<Link>, AppError> {
        let token_id = if caller.is_admin && all {
            None
        } else {
            Some(caller.id)
        };

        self.repository
            .list(&LinkFilter {
                token_id,
                url,
                meta,
            })
            .await
    }

    /// Updates the target and/or metadata of a URL.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the shortcut does not exist.
    pub async fn update(&self, shortcut: &str, patch: LinkPatch) -> Result<Link, AppError> {
        if patch.is_empty() {
            return self.get(shortcut).await;
        }

        let link = self
            .repository
            .update(shortcut, patch)
            .await?
            .ok_or_else(shortcut_not_found)?;

        tracing::info!(shortcut = %link.shortcut, "shortcut updated");
        Ok(link)
    }

    /// Deletes a URL.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the shortcut does not exist.
    pub async fn delete(&self, shortcut: &str) -> Result<(), AppError> {
        if !self.repository.delete(shortcut).await? {
            return Err(shortcut_not_found());
        }

        tracing::info!(%shortcut, "shortcut deleted");
        Ok(())
    }

    /// Checks that `caller` may act on the URL at `shortcut`.
    ///
    /// A missing shortcut passes; the handler decides on not-found.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InsufficientPermissions`] if the URL exists and is
    /// owned by another token and `caller` is not an admin.
    pub async fn authorize(&self, caller: &Token, shortcut: &str) -> Result<(), AppError> {
        match self.repository.find_by_shortcut(shortcut).await? {
            Some(link) if !link.is_writable_by(caller) => {
                tracing::info!(
                    %shortcut,
                    caller = %caller.name,
                    owner = %link.owner,
                    "ownership check failed"
                );
                Err(AppError::InsufficientPermissions)
            }
            _ => Ok(()),
        }
    }

    /// Resolves a shortcut to its target for public redirection.
    pub async fn resolve(&self, shortcut: &str) -> Result<Option<String>, AppError> {
        self.repository.find_target(shortcut).await
    }
}

fn reuse_or_conflict(existing: Link, draft: &LinkDraft) -> Result<Link, AppError> {
    if draft.allow_reuse && existing.url == draft.url {
        tracing::debug!(shortcut = %existing.shortcut, "reusing custom shortcut");
        Ok(existing)
    } else {
        Err(shortcut_conflict())
    }
}

fn shortcut_conflict() -> AppError {
    AppError::conflict("Shortcut already exists", &["shortcut"])
}

fn shortcut_not_found() -> AppError {
    AppError::not_found("Shortcut does not exist", &["shortcut"])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockLinkRepository;
    use chrono::Utc;
    use serde_json::json;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use uuid::Uuid;

    fn create_test_token(id: i64, is_admin: bool) -> Token {
        Token {
            id,
            api_key: Uuid::new_v4(),
            name: format!("token-{id}"),
            is_admin,
            is_blocked: false,
            token_uses: 0,
            last_access: Utc::now(),
            callback_url: None,
            created_at: Utc::now(),
        }
    }

    fn create_test_link(shortcut: &str, url: &str, token_id: i64, is_custom: bool) -> Link {
        Link {
            id: 1,
            shortcut: shortcut.to_string(),
            url: url.to_string(),
            is_custom,
            meta: Meta::new(),
            token_id,
            owner: format!("token-{token_id}"),
            created_at: Utc::now(),
        }
    }

    fn link_from(new_link: NewLink) -> Link {
        Link {
            id: 1,
            shortcut: new_link.shortcut,
            url: new_link.url,
            is_custom: new_link.is_custom,
            meta: new_link.meta,
            token_id: new_link.token_id,
            owner: format!("token-{}", new_link.token_id),
            created_at: Utc::now(),
        }
    }

    fn draft(url: &str, allow_reuse: bool) -> LinkDraft {
        LinkDraft {
            url: url.to_string(),
            meta: Meta::new(),
            allow_reuse,
        }
    }

    fn service(repo: MockLinkRepository) -> LinkService<MockLinkRepository> {
        LinkService::new(Arc::new(repo), ShortcutPolicy::new(5, HashSet::new()))
    }

    #[tokio::test]
    async fn test_create_generated_success() {
        let mut mock_repo = MockLinkRepository::new();

        mock_repo.expect_find_reusable().times(0);
        mock_repo
            .expect_try_create()
            .withf(|l| l.shortcut.len() == 5 && !l.is_custom && l.token_id == 3)
            .times(1)
            .returning(|l| Ok(Some(link_from(l))));

        let owner = create_test_token(3, false);
        let link = service(mock_repo)
            .create_generated(&owner, draft("http://example.com", false))
            .await
            .unwrap();

        assert_eq!(link.url, "http://example.com");
        assert!(!link.is_custom);
    }

    #[tokio::test]
    async fn test_create_generated_reuses_existing_target() {
        let mut mock_repo = MockLinkRepository::new();

        let existing = create_test_link("bcdfg", "http://example.com", 9, false);
        mock_repo
            .expect_find_reusable()
            .withf(|url| url == "http://example.com")
            .times(1)
            .returning(move |_| Ok(Some(existing.clone())));
        mock_repo.expect_try_create().times(0);

        let owner = create_test_token(3, false);
        let link = service(mock_repo)
            .create_generated(&owner, draft("http://example.com", true))
            .await
            .unwrap();

        assert_eq!(link.shortcut, "bcdfg");
    }

    #[tokio::test]
    async fn test_create_generated_retries_on_collision() {
        let mut mock_repo = MockLinkRepository::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = calls.clone();
        mock_repo.expect_try_create().returning(move |l| {
            if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                Ok(None)
            } else {
                Ok(Some(link_from(l)))
            }
        });

        let owner = create_test_token(3, false);
        let result = service(mock_repo)
            .create_generated(&owner, draft("http://example.com", false))
            .await;

        assert!(result.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_create_generated_gives_up_after_max_attempts() {
        let mut mock_repo = MockLinkRepository::new();

        mock_repo
            .expect_try_create()
            .times(MAX_GENERATION_ATTEMPTS)
            .returning(|_| Ok(None));

        let owner = create_test_token(3, false);
        let err = service(mock_repo)
            .create_generated(&owner, draft("http://example.com", false))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Internal { .. }));
    }

    #[tokio::test]
    async fn test_create_custom_success() {
        let mut mock_repo = MockLinkRepository::new();

        mock_repo
            .expect_find_by_shortcut()
            .times(1)
            .returning(|_| Ok(None));
        mock_repo
            .expect_try_create()
            .withf(|l| l.shortcut == "my-link" && l.is_custom)
            .times(1)
            .returning(|l| Ok(Some(link_from(l))));

        let owner = create_test_token(3, false);
        let link = service(mock_repo)
            .create_custom(&owner, "my-link", draft("http://example.com", false))
            .await
            .unwrap();

        assert!(link.is_custom);
        assert_eq!(link.shortcut, "my-link");
    }

    #[tokio::test]
    async fn test_create_custom_existing_without_reuse_conflicts() {
        let mut mock_repo = MockLinkRepository::new();

        let existing = create_test_link("my-link", "http://example.com", 3, true);
        mock_repo
            .expect_find_by_shortcut()
            .times(1)
            .returning(move |_| Ok(Some(existing.clone())));
        mock_repo.expect_try_create().times(0);

        let owner = create_test_token(3, false);
        let err = service(mock_repo)
            .create_custom(&owner, "my-link", draft("http://example.com", false))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_create_custom_reuse_requires_same_target() {
        let mut mock_repo = MockLinkRepository::new();

        let existing = create_test_link("my-link", "http://example.com", 3, true);
        mock_repo
            .expect_find_by_shortcut()
            .times(2)
            .returning(move |_| Ok(Some(existing.clone())));

        let service = service(mock_repo);
        let owner = create_test_token(3, false);

        let same = service
            .create_custom(&owner, "my-link", draft("http://example.com", true))
            .await;
        assert_eq!(same.unwrap().shortcut, "my-link");

        let other = service
            .create_custom(&owner, "my-link", draft("http://other.com", true))
            .await;
        assert!(matches!(other.unwrap_err(), AppError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_create_custom_lost_race_conflicts() {
        let mut mock_repo = MockLinkRepository::new();
        let lookups = Arc::new(AtomicUsize::new(0));

        let counter = lookups.clone();
        mock_repo.expect_find_by_shortcut().returning(move |_| {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Ok(None)
            } else {
                Ok(Some(create_test_link("my-link", "http://winner.com", 4, true)))
            }
        });
        mock_repo
            .expect_try_create()
            .times(1)
            .returning(|_| Ok(None));

        let owner = create_test_token(3, false);
        let err = service(mock_repo)
            .create_custom(&owner, "my-link", draft("http://example.com", true))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_list_scopes_to_caller_unless_admin_asks_for_all() {
        let mut mock_repo = MockLinkRepository::new();

        mock_repo
            .expect_list()
            .withf(|f| f.token_id == Some(3))
            .times(2)
            .returning(|_| Ok(vec![]));
        mock_repo
            .expect_list()
            .withf(|f| f.token_id.is_none())
            .times(1)
            .returning(|_| Ok(vec![]));

        let service = service(mock_repo);
        let user = create_test_token(3, false);
        let admin = create_test_token(1, true);

        service.list(&user, true, None, Meta::new()).await.unwrap();
        let mut admin_own = admin.clone();
        admin_own.id = 3;
        service.list(&admin_own, false, None, Meta::new()).await.unwrap();
        service.list(&admin, true, None, Meta::new()).await.unwrap();
    }

    #[tokio::test]
    async fn test_list_passes_meta_filter() {
        let mut mock_repo = MockLinkRepository::new();

        mock_repo
            .expect_list()
            .withf(|f| f.meta.get("a") == Some(&json!("x")) && f.url.is_none())
            .times(1)
            .returning(|_| Ok(vec![]));

        let mut meta = Meta::new();
        meta.insert("a".to_string(), json!("x"));

        let user = create_test_token(3, false);
        service(mock_repo).list(&user, false, None, meta).await.unwrap();
    }

    #[tokio::test]
    async fn test_update_missing_shortcut() {
        let mut mock_repo = MockLinkRepository::new();

        mock_repo
            .expect_update()
            .times(1)
            .returning(|_, _| Ok(None));

        let patch = LinkPatch {
            url: Some("http://example.com".to_string()),
            meta: None,
        };
        let err = service(mock_repo).update("nope", patch).await.unwrap_err();

        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_empty_update_returns_current_record() {
        let mut mock_repo = MockLinkRepository::new();

        mock_repo.expect_update().times(0);
        mock_repo
            .expect_find_by_shortcut()
            .times(1)
            .returning(|_| Ok(Some(create_test_link("abc", "http://a.ch", 1, true))));

        let link = service(mock_repo)
            .update("abc", LinkPatch::default())
            .await
            .unwrap();

        assert_eq!(link.url, "http://a.ch");
    }

    #[tokio::test]
    async fn test_delete_missing_shortcut() {
        let mut mock_repo = MockLinkRepository::new();

        mock_repo
            .expect_delete()
            .times(1)
            .returning(|_| Ok(false));

        let err = service(mock_repo).delete("nope").await.unwrap_err();

        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_authorize() {
        let mut mock_repo = MockLinkRepository::new();

        mock_repo
            .expect_find_by_shortcut()
            .withf(|s| s == "owned")
            .returning(|_| Ok(Some(create_test_link("owned", "http://a.ch", 3, true))));
        mock_repo
            .expect_find_by_shortcut()
            .withf(|s| s == "missing")
            .returning(|_| Ok(None));

        let service = service(mock_repo);
        let owner = create_test_token(3, false);
        let stranger = create_test_token(4, false);
        let admin = create_test_token(5, true);

        assert!(service.authorize(&owner, "owned").await.is_ok());
        assert!(service.authorize(&admin, "owned").await.is_ok());
        assert!(matches!(
            service.authorize(&stranger, "owned").await,
            Err(AppError::InsufficientPermissions)
        ));
        assert!(service.authorize(&stranger, "missing").await.is_ok());
    }

    #[tokio::test]
    async fn test_resolve() {
        let mut mock_repo = MockLinkRepository::new();

        mock_repo
            .expect_find_target()
            .withf(|s| s == "abc")
            .times(1)
            .returning(|_| Ok(Some("http://example.com".to_string())));

        let target = service(mock_repo).resolve("abc").await.unwrap();

        assert_eq!(target.as_deref(), Some("http://example.com"));
    }
}
