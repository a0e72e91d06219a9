//! API route configuration.
//!
//! All API endpoints require Bearer token authentication via
//! [`crate::api::middleware::auth::layer`]. Collections are served both with
//! and without a trailing slash.

use crate::api::handlers::{
    create_link_handler, create_token_handler, delete_link_handler, delete_token_handler,
    get_link_handler, get_token_handler, list_links_handler, list_tokens_handler,
    put_link_handler, update_link_handler, update_token_handler,
};
use crate::api::middleware::auth;
use crate::state::AppState;
use axum::{
    Router, middleware,
    routing::{get, post},
};

/// All API routes, with authentication and per-route authorization applied.
///
/// # Endpoints
///
/// - `POST   /tokens/`            - Create a token (admin)
/// - `GET    /tokens/`            - List tokens (admin)
/// - `GET    /tokens/{api_key}`   - Get a token (admin)
/// - `PATCH  /tokens/{api_key}`   - Update a token (admin)
/// - `DELETE /tokens/{api_key}`   - Delete a token (admin)
/// - `POST   /urls/`              - Create a URL with a generated shortcut
/// - `GET    /urls/`              - List URLs
/// - `PUT    /urls/{shortcut}`    - Create a URL with a chosen shortcut (owner/admin)
/// - `GET    /urls/{shortcut}`    - Get a URL (owner/admin)
/// - `PATCH  /urls/{shortcut}`    - Update a URL (owner/admin)
/// - `DELETE /urls/{shortcut}`    - Delete a URL (owner/admin)
pub fn protected_routes(state: AppState) -> Router<AppState> {
    let tokens = Router::new()
        .route(
            "/tokens",
            post(create_token_handler).get(list_tokens_handler),
        )
        .route(
            "/tokens/",
            post(create_token_handler).get(list_tokens_handler),
        )
        .route(
            "/tokens/{api_key}",
            get(get_token_handler)
                .patch(update_token_handler)
                .delete(delete_token_handler),
        )
        .route_layer(middleware::from_fn(auth::admin_only));

    let url_collection = Router::new()
        .route("/urls", post(create_link_handler).get(list_links_handler))
        .route("/urls/", post(create_link_handler).get(list_links_handler));

    let url_members = Router::new()
        .route(
            "/urls/{shortcut}",
            get(get_link_handler)
                .put(put_link_handler)
                .patch(update_link_handler)
                .delete(delete_link_handler),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::owner_only,
        ));

    Router::new()
        .merge(tokens)
        .merge(url_collection)
        .merge(url_members)
        .route_layer(middleware::from_fn_with_state(state, auth::layer))
}
