//! Shared application state injected into handlers and middleware.

use sqlx::PgPool;
use std::sync::Arc;

use crate::application::services::{AuthService, LinkService, TokenService};
use crate::config::Config;
use crate::infrastructure::persistence::{PgLinkRepository, PgTokenRepository};
use crate::utils::shortcut::ShortcutPolicy;

pub type PgAuthService = AuthService<PgTokenRepository>;
pub type PgTokenService = TokenService<PgTokenRepository>;
pub type PgLinkService = LinkService<PgLinkRepository>;

/// Application state, cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<PgAuthService>,
    pub token_service: Arc<PgTokenService>,
    pub link_service: Arc<PgLinkService>,
    pub pool: Arc<PgPool>,
    /// Base URL that `short_url` is built from.
    pub redirection_host: String,
    /// Target of `GET /`, if any.
    pub index_redirect: Option<String>,
    /// Trust `X-Forwarded-For` / `X-Real-IP` for the client address.
    pub behind_proxy: bool,
}

impl AppState {
    /// Wires repositories and services on top of a connection pool.
    pub fn new(pool: Arc<PgPool>, config: &Config) -> Self {
        let token_repository = Arc::new(PgTokenRepository::new(pool.clone()));
        let link_repository = Arc::new(PgLinkRepository::new(pool.clone()));

        let policy = ShortcutPolicy::new(config.url_length, config.blacklisted_urls.clone());

        Self {
            auth_service: Arc::new(AuthService::new(token_repository.clone())),
            token_service: Arc::new(TokenService::new(token_repository)),
            link_service: Arc::new(LinkService::new(link_repository, policy)),
            pool,
            redirection_host: config.redirection_host.clone(),
            index_redirect: config.index_redirect.clone(),
            behind_proxy: config.behind_proxy,
        }
    }
}
