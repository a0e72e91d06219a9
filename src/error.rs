//! Application error taxonomy and its HTTP mapping.
//!
//! Every failure a request can hit is one [`AppError`] variant. Handlers and
//! middleware return `Result<_, AppError>` and the [`IntoResponse`] impl turns
//! the error into the uniform envelope:
//!
//! ```json
//! {
//!   "status": 409,
//!   "error": {
//!     "code": "conflict",
//!     "description": "Token with name exists",
//!     "args": ["name"]
//!   }
//! }
//! ```

use std::collections::BTreeMap;

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use validator::{ValidationError, ValidationErrors, ValidationErrorsKind};

use crate::utils::db_error::{is_foreign_key_violation, is_unique_violation};

/// Per-field messages of a `validation-error`, keyed by field name.
pub type FieldMessages = BTreeMap<String, Vec<String>>;

/// Body of an error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub status: u16,
    pub error: ErrorInfo,
}

/// The `error` object of the envelope.
#[derive(Debug, Serialize)]
pub struct ErrorInfo {
    pub code: &'static str,
    pub description: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub messages: FieldMessages,
}

#[derive(Debug, Error)]
pub enum AppError {
    /// Missing, malformed, unknown or blocked credential (401).
    #[error("The token you have entered is invalid")]
    InvalidToken,

    /// Caller is identified but not allowed to perform the action (403).
    #[error("You are not allowed to make this request")]
    InsufficientPermissions,

    /// A semantically required argument is absent (400).
    #[error("{message}")]
    MissingArgs { message: String, args: Vec<String> },

    /// One or more fields failed validation (400).
    #[error("Invalid input")]
    Validation { messages: FieldMessages },

    /// Uniqueness or referential-integrity violation (409).
    #[error("{message}")]
    Conflict { message: String, args: Vec<String> },

    /// Lookup by key or shortcut failed (404).
    #[error("{message}")]
    NotFound { message: String, args: Vec<String> },

    /// Member-only operation invoked on a collection path (405).
    #[error("This HTTP method is not allowed")]
    InvalidMethod,

    /// Anything unanticipated (500). The message is logged, never returned.
    #[error("Internal error: {message}")]
    Internal { message: String },
}

fn to_args(args: &[&str]) -> Vec<String> {
    args.iter().map(|a| a.to_string()).collect()
}

impl AppError {
    pub fn missing_args(message: impl Into<String>, args: &[&str]) -> Self {
        Self::MissingArgs {
            message: message.into(),
            args: to_args(args),
        }
    }

    pub fn conflict(message: impl Into<String>, args: &[&str]) -> Self {
        Self::Conflict {
            message: message.into(),
            args: to_args(args),
        }
    }

    pub fn not_found(message: impl Into<String>, args: &[&str]) -> Self {
        Self::NotFound {
            message: message.into(),
            args: to_args(args),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// A validation error for a single field.
    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        let mut messages = FieldMessages::new();
        messages.insert(field.to_string(), vec![message.into()]);
        Self::Validation { messages }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::InsufficientPermissions => StatusCode::FORBIDDEN,
            AppError::MissingArgs { .. } | AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::InvalidMethod => StatusCode::METHOD_NOT_ALLOWED,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidToken => "invalid-token",
            AppError::InsufficientPermissions => "insufficient-permissions",
            AppError::MissingArgs { .. } => "missing-args",
            AppError::Validation { .. } => "validation-error",
            AppError::Conflict { .. } => "conflict",
            AppError::NotFound { .. } => "not-found",
            AppError::InvalidMethod => "invalid-method",
            AppError::Internal { .. } => "internal-error",
        }
    }

    /// Builds the `error` object of the envelope.
    pub fn to_error_info(&self) -> ErrorInfo {
        let (description, args, messages) = match self {
            AppError::MissingArgs { message, args }
            | AppError::Conflict { message, args }
            | AppError::NotFound { message, args } => {
                (message.clone(), args.clone(), BTreeMap::new())
            }
            AppError::Validation { messages } => (
                self.to_string(),
                messages.keys().cloned().collect(),
                messages.clone(),
            ),
            AppError::Internal { .. } => (
                "Sorry, something went wrong".to_string(),
                Vec::new(),
                BTreeMap::new(),
            ),
            _ => (self.to_string(), Vec::new(), BTreeMap::new()),
        };

        ErrorInfo {
            code: self.code(),
            description,
            args,
            messages,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if let AppError::Internal { message } = &self {
            tracing::error!(error = %message, "request failed with internal error");
        }

        let body = ErrorBody {
            status: status.as_u16(),
            error: self.to_error_info(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        if is_unique_violation(&e) {
            return AppError::conflict("Unique constraint violation", &[]);
        }
        if is_foreign_key_violation(&e) {
            return AppError::conflict("Referenced record is still in use", &[]);
        }

        AppError::internal(format!("database error: {e}"))
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let mut messages = FieldMessages::new();
        add_field_messages(&mut messages, errors);
        AppError::Validation { messages }
    }
}

/// Appends every field error of `errors` to `messages`.
pub fn add_field_messages(messages: &mut FieldMessages, errors: ValidationErrors) {
    for (field, kind) in errors.into_errors() {
        let entry = messages.entry(field.to_string()).or_default();
        match kind {
            ValidationErrorsKind::Field(errs) => entry.extend(errs.iter().map(describe)),
            _ => entry.push("Invalid value".to_string()),
        }
    }
}

/// The user-facing text of a single field error.
pub fn describe(error: &ValidationError) -> String {
    error
        .message
        .as_ref()
        .map(|m| m.to_string())
        .unwrap_or_else(|| format!("Invalid value ({})", error.code))
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::invalid_field("body", rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::invalid_field("query", rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::invalid_field("path", rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::ValidationError;

    async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_conflict_envelope() {
        let (status, body) =
            body_json(AppError::conflict("Token with name exists", &["name"])).await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(
            body,
            serde_json::json!({
                "status": 409,
                "error": {
                    "code": "conflict",
                    "description": "Token with name exists",
                    "args": ["name"]
                }
            })
        );
    }

    #[tokio::test]
    async fn test_invalid_token_envelope_has_no_extras() {
        let (status, body) = body_json(AppError::InvalidToken).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "invalid-token");
        assert!(body["error"].get("args").is_none());
        assert!(body["error"].get("messages").is_none());
    }

    #[tokio::test]
    async fn test_internal_error_hides_details() {
        let (status, body) = body_json(AppError::internal("connection reset by peer")).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], "internal-error");
        assert_eq!(body["error"]["description"], "Sorry, something went wrong");
        assert!(!body.to_string().contains("connection reset"));
    }

    #[tokio::test]
    async fn test_validation_errors_are_aggregated() {
        let mut errors = ValidationErrors::new();
        errors.add(
            "url",
            ValidationError::new("url").with_message("Not a valid URL.".into()),
        );
        errors.add(
            "shortcut",
            ValidationError::new("shortcut").with_message("Invalid shortcut.".into()),
        );

        let (status, body) = body_json(AppError::from(errors)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "validation-error");
        assert_eq!(body["error"]["args"], serde_json::json!(["shortcut", "url"]));
        assert_eq!(body["error"]["messages"]["url"][0], "Not a valid URL.");
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::InsufficientPermissions.status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::missing_args("URL missing", &["url"]).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::not_found("Shortcut does not exist", &["shortcut"]).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::InvalidMethod.status(),
            StatusCode::METHOD_NOT_ALLOWED
        );
    }

    #[test]
    fn test_non_database_sqlx_error_is_internal() {
        let err = AppError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, AppError::Internal { .. }));
    }
}
