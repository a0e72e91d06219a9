//! Handler for public shortcut redirects.

use axum::{
    extract::{Path, State},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use url::Url;

use crate::error::AppError;
use crate::state::AppState;

/// Redirects a shortcut to its target URL.
///
/// # Endpoint
///
/// `GET /{shortcut}`
///
/// No authentication and no usage accounting.
///
/// # Responses
///
/// - `307 Temporary Redirect` to the stored target
/// - `404 Not Found` with an empty body for unknown shortcuts
pub async fn redirect_handler(
    Path(shortcut): Path<String>,
    State(state): State<AppState>,
) -> Result<Response, AppError> {
    match state.link_service.resolve(&shortcut).await? {
        Some(target) => {
            tracing::debug!(%shortcut, %target, "redirecting");
            redirect_to(&target)
        }
        None => Ok(StatusCode::NOT_FOUND.into_response()),
    }
}

/// Builds a `307` response to `target`.
///
/// Targets with characters not allowed in a header (non-ASCII hosts or
/// paths) are sent in their percent-encoded form.
pub fn redirect_to(target: &str) -> Result<Response, AppError> {
    let location = match HeaderValue::from_str(target) {
        Ok(value) => value,
        Err(_) => {
            let url = Url::parse(target)
                .map_err(|e| AppError::internal(format!("stored target {target:?}: {e}")))?;
            HeaderValue::from_str(url.as_str())
                .map_err(|e| AppError::internal(format!("stored target {target:?}: {e}")))?
        }
    };

    Ok((StatusCode::TEMPORARY_REDIRECT, [(header::LOCATION, location)]).into_response())
}
