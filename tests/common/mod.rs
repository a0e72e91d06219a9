#![allow(dead_code)]

use axum::extract::ConnectInfo;
use axum_test::TestServer;
use shortcut_api::config::Config;
use shortcut_api::domain::repositories::{LinkRepository, TokenRepository};
use shortcut_api::infrastructure::persistence::{PgLinkRepository, PgTokenRepository};
use shortcut_api::prelude::{AppState, Link, Meta, NewLink, NewToken, Token};
use shortcut_api::routes::app_router;
use sqlx::PgPool;
use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::Layer;
use uuid::Uuid;

pub const REDIRECTION_HOST: &str = "https://s.example.com";
pub const BLACKLISTED: &str = "forbidden";

pub fn test_config() -> Config {
    Config {
        database_url: "postgres://localhost/test".to_string(),
        listen_addr: "127.0.0.1:0".to_string(),
        log_level: "debug".to_string(),
        log_format: "text".to_string(),
        behind_proxy: false,
        url_length: 5,
        blacklisted_urls: HashSet::from([BLACKLISTED.to_string()]),
        redirection_host: REDIRECTION_HOST.to_string(),
        index_redirect: None,
        db_max_connections: 5,
        db_connect_timeout: 5,
        db_idle_timeout: 60,
        db_max_lifetime: 60,
    }
}

pub fn create_test_state(pool: PgPool) -> AppState {
    AppState::new(Arc::new(pool), &test_config())
}

/// Full application router, as served in production.
pub fn create_test_server(pool: PgPool) -> TestServer {
    create_test_server_with(pool, test_config())
}

pub fn create_test_server_with(pool: PgPool, config: Config) -> TestServer {
    let state = AppState::new(Arc::new(pool), &config);
    let app = app_router(state).layer(MockConnectInfoLayer);
    TestServer::new(app).unwrap()
}

pub async fn create_token(pool: &PgPool, name: &str, is_admin: bool) -> Token {
    insert_token(pool, name, is_admin, false).await
}

pub async fn create_blocked_token(pool: &PgPool, name: &str) -> Token {
    insert_token(pool, name, false, true).await
}

async fn insert_token(pool: &PgPool, name: &str, is_admin: bool, is_blocked: bool) -> Token {
    PgTokenRepository::new(Arc::new(pool.clone()))
        .create(NewToken {
            api_key: Uuid::new_v4(),
            name: name.to_string(),
            is_admin,
            is_blocked,
            callback_url: None,
        })
        .await
        .unwrap()
        .unwrap()
}

pub async fn find_token(pool: &PgPool, api_key: Uuid) -> Token {
    PgTokenRepository::new(Arc::new(pool.clone()))
        .find_by_api_key(api_key)
        .await
        .unwrap()
        .unwrap()
}

pub async fn create_link(
    pool: &PgPool,
    shortcut: &str,
    url: &str,
    owner: &Token,
    meta: serde_json::Value,
) -> Link {
    let meta: Meta = serde_json::from_value(meta).unwrap();

    PgLinkRepository::new(Arc::new(pool.clone()))
        .try_create(NewLink {
            shortcut: shortcut.to_string(),
            url: url.to_string(),
            is_custom: true,
            meta,
            token_id: owner.id,
        })
        .await
        .unwrap()
        .unwrap()
}

pub fn bearer(token: &Token) -> String {
    format!("Bearer {}", token.api_key)
}

/// Inserts a fixed peer address, as `into_make_service_with_connect_info` does.
#[derive(Clone)]
pub struct MockConnectInfoLayer;

impl<S> Layer<S> for MockConnectInfoLayer {
    type Service = MockConnectInfoService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MockConnectInfoService { inner }
    }
}

#[derive(Clone)]
pub struct MockConnectInfoService<S> {
    inner: S,
}

impl<S, B> tower::Service<axum::http::Request<B>> for MockConnectInfoService<S>
where
    S: tower::Service<axum::http::Request<B>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: axum::http::Request<B>) -> Self::Future {
        let addr: SocketAddr = "127.0.0.1:12345".parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(addr));
        self.inner.call(req)
    }
}
