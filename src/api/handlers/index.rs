//! Handler for the service root.

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};

use crate::api::handlers::redirect::redirect_to;
use crate::error::AppError;
use crate::state::AppState;

/// `GET /`
///
/// Redirects to `INDEX_REDIRECT` when configured, otherwise answers with a
/// short plain-text notice.
pub async fn index_handler(State(state): State<AppState>) -> Result<Response, AppError> {
    match &state.index_redirect {
        Some(target) => redirect_to(target),
        None => Ok((
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            "Nothing to see here",
        )
            .into_response()),
    }
}

/// Fallback for a known path called with an unsupported method.
pub async fn method_not_allowed_handler() -> AppError {
    AppError::InvalidMethod
}
