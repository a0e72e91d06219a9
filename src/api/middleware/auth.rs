//! Bearer token authentication and authorization middleware.
//!
//! Layers run in a fixed order on every protected route: [`layer`]
//! authenticates, then [`admin_only`] or [`owner_only`] authorize. Each stage
//! may end the request with an error response.

use axum::{
    extract::{FromRequestParts, Path, Request, State},
    middleware::Next,
    response::Response,
};
use axum_auth::AuthBearer;

use crate::api::extract::Caller;
use crate::api::middleware::access_log::AccessUser;
use crate::application::services::require_admin;
use crate::{error::AppError, state::AppState};

/// Authenticates requests using the API key in the `Authorization` header.
///
/// # Header Format
///
/// ```text
/// Authorization: Bearer <api_key>
/// ```
///
/// # Authentication Flow
///
/// 1. Extract the key from the `Authorization` header
/// 2. Look up the token and, if it is not blocked, count the use
/// 3. Store the [`crate::domain::entities::Token`] in request extensions
/// 4. Continue to next middleware/handler
/// 5. Tag the response with the token name for the access log
///
/// # Errors
///
/// Returns `401 invalid-token` if:
/// - Authorization header is missing or not a Bearer credential
/// - The key is not a UUID
/// - The token does not exist or is blocked
///
/// # Example
///
/// ```rust,ignore
/// use axum::{Router, routing::get, middleware};
/// use crate::api::middleware::auth;
///
/// let protected = Router::new()
///     .route("/urls", get(list_links_handler))
///     .route_layer(middleware::from_fn_with_state(state.clone(), auth::layer));
/// ```
pub async fn layer(
    State(st): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    let AuthBearer(credential) = AuthBearer::from_request_parts(&mut parts, &())
        .await
        .map_err(|_| AppError::InvalidToken)?;

    let token = st.auth_service.authenticate(&credential).await?;
    let user = AccessUser(token.name.clone());
    parts.extensions.insert(token);

    let req = Request::from_parts(parts, body);

    let mut response = next.run(req).await;
    response.extensions_mut().insert(user);
    Ok(response)
}

/// Rejects callers whose token is not an admin token.
///
/// Must be layered inside [`layer`]. The use of the token has already been
/// counted by then, so a rejected request still shows up in `token_uses`.
///
/// # Errors
///
/// Returns `403 insufficient-permissions` for non-admin tokens.
pub async fn admin_only(
    Caller(caller): Caller,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    require_admin(&caller)?;
    Ok(next.run(req).await)
}

/// Rejects callers acting on a URL owned by another token.
///
/// Admins pass. A shortcut that does not exist passes too; the handler
/// reports not-found or creates it.
///
/// # Errors
///
/// Returns `403 insufficient-permissions` for foreign URLs.
pub async fn owner_only(
    State(st): State<AppState>,
    Path(shortcut): Path<String>,
    Caller(caller): Caller,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    st.link_service.authorize(&caller, &shortcut).await?;
    Ok(next.run(req).await)
}
