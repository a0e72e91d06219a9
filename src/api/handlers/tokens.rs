//! Handlers for the admin-only token endpoints.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::api::dto::token::{
    CreateTokenRequest, TokenListQuery, TokenResponse, UpdateTokenRequest,
};
use crate::api::extract::{ApiJson, ApiQuery};
use crate::error::AppError;
use crate::state::AppState;

/// Creates an API token.
///
/// # Endpoint
///
/// `POST /tokens/`
///
/// # Request Body
///
/// ```json
/// {
///   "name": "indico",
///   "is_admin": false,
///   "callback_url": "https://indico.example.com/hook"
/// }
/// ```
///
/// # Errors
///
/// - `400 missing-args` if `name` is absent
/// - `400 validation-error` if `callback_url` is not an http(s) URL
/// - `409 conflict` if the name is taken
pub async fn create_token_handler(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateTokenRequest>,
) -> Result<(StatusCode, Json<TokenResponse>), AppError> {
    let name = payload.name.ok_or_else(|| {
        AppError::missing_args(
            "New tokens need to mention the \"name\" attribute",
            &["name"],
        )
    })?;

    let token = state
        .token_service
        .create(
            name,
            payload.is_admin,
            payload.is_blocked,
            payload.callback_url,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(token.into())))
}

/// Lists tokens, optionally filtered.
///
/// # Endpoint
///
/// `GET /tokens/?name=..&is_admin=..&is_blocked=..&callback_url=..`
pub async fn list_tokens_handler(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<TokenListQuery>,
) -> Result<Json<Vec<TokenResponse>>, AppError> {
    let tokens = state.token_service.list(&query.into()).await?;

    Ok(Json(tokens.into_iter().map(TokenResponse::from).collect()))
}

/// `GET /tokens/{api_key}`
pub async fn get_token_handler(
    State(state): State<AppState>,
    Path(api_key): Path<String>,
) -> Result<Json<TokenResponse>, AppError> {
    let token = state.token_service.get(&api_key).await?;

    Ok(Json(token.into()))
}

/// Updates `is_admin`, `is_blocked` and/or `callback_url` of a token.
///
/// # Endpoint
///
/// `PATCH /tokens/{api_key}`
///
/// A `name` in the body is ignored.
pub async fn update_token_handler(
    State(state): State<AppState>,
    Path(api_key): Path<String>,
    ApiJson(payload): ApiJson<UpdateTokenRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let token = state.token_service.update(&api_key, payload.into()).await?;

    Ok(Json(token.into()))
}

/// Deletes a token that owns no URLs.
///
/// # Endpoint
///
/// `DELETE /tokens/{api_key}`
///
/// # Responses
///
/// - `204 No Content` on success
/// - `404 not-found` if the key does not exist
/// - `409 conflict` if URLs still reference the token
pub async fn delete_token_handler(
    State(state): State<AppState>,
    Path(api_key): Path<String>,
) -> Result<StatusCode, AppError> {
    state.token_service.delete(&api_key).await?;

    Ok(StatusCode::NO_CONTENT)
}
