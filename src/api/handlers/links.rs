//! Handlers for the URL endpoints.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::api::dto::link::{CreateLinkRequest, LinkListQuery, LinkResponse, UpdateLinkRequest};
use crate::api::extract::{ApiJson, ApiQuery, Caller, CheckedJson};
use crate::error::{AppError, describe};
use crate::state::AppState;

/// Creates a URL under a generated shortcut.
///
/// # Endpoint
///
/// `POST /urls/`
///
/// # Request Body
///
/// ```json
/// {
///   "url": "https://example.com/some/long/path",
///   "meta": {"event": "42"},
///   "allow_reuse": true
/// }
/// ```
///
/// With `allow_reuse`, an existing generated shortcut for the same target is
/// returned instead of a new one.
///
/// # Errors
///
/// - `400 missing-args` if `url` is absent
/// - `400 validation-error` if `url` is not an absolute URL
pub async fn create_link_handler(
    State(state): State<AppState>,
    Caller(caller): Caller,
    ApiJson(payload): ApiJson<CreateLinkRequest>,
) -> Result<(StatusCode, Json<LinkResponse>), AppError> {
    let draft = payload.into_draft()?;

    let link = state.link_service.create_generated(&caller, draft).await?;

    Ok((
        StatusCode::CREATED,
        Json(LinkResponse::from_link(link, &state.redirection_host)),
    ))
}

/// Creates a URL under a caller-chosen shortcut.
///
/// # Endpoint
///
/// `PUT /urls/{shortcut}`
///
/// Shortcut and body errors are reported together in one
/// `validation-error`. The shortcut itself is only checked when it is not
/// stored yet; an existing one is reused or reported as a conflict even if
/// it would no longer be accepted (e.g. blacklisted since).
///
/// # Errors
///
/// - `400 validation-error` for a bad URL, or a shortcut that is malformed,
///   reserved or blacklisted
/// - `403 insufficient-permissions` if the shortcut belongs to another token
/// - `409 conflict` if the shortcut exists and cannot be reused
pub async fn put_link_handler(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(shortcut): Path<String>,
    body: CheckedJson<CreateLinkRequest>,
) -> Result<(StatusCode, Json<LinkResponse>), AppError> {
    let CheckedJson {
        value: payload,
        mut errors,
    } = body;

    let exists = state.link_service.find(&shortcut).await?.is_some();
    if !exists && let Err(e) = state.link_service.validate_shortcut(&shortcut) {
        errors
            .entry("shortcut".to_string())
            .or_default()
            .push(describe(&e));
    }
    if !errors.is_empty() {
        return Err(AppError::Validation { messages: errors });
    }

    let draft = payload.into_draft()?;

    let link = state
        .link_service
        .create_custom(&caller, &shortcut, draft)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(LinkResponse::from_link(link, &state.redirection_host)),
    ))
}

/// Lists the caller's URLs, or every URL for an admin passing `all=true`.
///
/// # Endpoint
///
/// `GET /urls/?all=true&url=..&meta.<key>=<value>`
///
/// Metadata filters are a subset match against the stored metadata.
pub async fn list_links_handler(
    State(state): State<AppState>,
    Caller(caller): Caller,
    ApiQuery(pairs): ApiQuery<Vec<(String, String)>>,
) -> Result<Json<Vec<LinkResponse>>, AppError> {
    let query = LinkListQuery::try_from(pairs)?;

    let links = state
        .link_service
        .list(&caller, query.all, query.url, query.meta)
        .await?;

    Ok(Json(
        links
            .into_iter()
            .map(|link| LinkResponse::from_link(link, &state.redirection_host))
            .collect(),
    ))
}

/// `GET /urls/{shortcut}`
pub async fn get_link_handler(
    State(state): State<AppState>,
    Path(shortcut): Path<String>,
) -> Result<Json<LinkResponse>, AppError> {
    let link = state.link_service.get(&shortcut).await?;

    Ok(Json(LinkResponse::from_link(link, &state.redirection_host)))
}

/// Updates the target and/or metadata of a URL.
///
/// # Endpoint
///
/// `PATCH /urls/{shortcut}`
pub async fn update_link_handler(
    State(state): State<AppState>,
    Path(shortcut): Path<String>,
    ApiJson(payload): ApiJson<UpdateLinkRequest>,
) -> Result<Json<LinkResponse>, AppError> {
    let link = state
        .link_service
        .update(&shortcut, payload.into())
        .await?;

    Ok(Json(LinkResponse::from_link(link, &state.redirection_host)))
}

/// `DELETE /urls/{shortcut}`
pub async fn delete_link_handler(
    State(state): State<AppState>,
    Path(shortcut): Path<String>,
) -> Result<StatusCode, AppError> {
    state.link_service.delete(&shortcut).await?;

    Ok(StatusCode::NO_CONTENT)
}
