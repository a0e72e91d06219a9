//! Extractors that report failures in the API error envelope.
//!
//! Axum's built-in `Json` and `Query` reject with plain-text bodies. These
//! wrappers map the rejection into [`AppError`] so a malformed body or query
//! string yields a `validation-error` like any other bad input.
//!
//! JSON bodies are decoded field by field: a field of the wrong type is
//! reported under its own name and dropped, the rest of the body is decoded
//! and validated, and every field error ends up in one response.

use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::request::Parts,
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use validator::Validate;

use crate::domain::entities::Token;
use crate::error::{AppError, FieldMessages, add_field_messages};

/// Request bodies whose top-level fields can be type-checked one by one.
pub trait FieldTypes {
    /// Records a message for, and removes, every field of `body` whose
    /// value does not deserialize into the field's type.
    fn check_types(body: &mut Map<String, Value>, errors: &mut FieldMessages);
}

/// Type-checks `body[key]` as `F`, reporting a mismatch under `field`.
///
/// `key` differs from `field` for aliases such as `metadata` for `meta`.
pub fn check_field<F: DeserializeOwned>(
    body: &mut Map<String, Value>,
    key: &str,
    field: &str,
    errors: &mut FieldMessages,
) {
    let Some(value) = body.get(key) else {
        return;
    };

    if let Err(e) = serde_json::from_value::<F>(value.clone()) {
        errors.entry(field.to_string()).or_default().push(e.to_string());
        body.remove(key);
    }
}

/// JSON body together with all of its field errors.
///
/// Never rejects for field-level problems, so a handler can add errors of
/// its own (e.g. for a path segment) before answering. Use [`ApiJson`] when
/// there is nothing to add.
#[derive(Debug)]
pub struct CheckedJson<T> {
    pub value: T,
    pub errors: FieldMessages,
}

impl<S, T> FromRequest<S> for CheckedJson<T>
where
    T: DeserializeOwned + Validate + FieldTypes,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(body) = Json::<Value>::from_request(req, state).await?;
        let Value::Object(mut body) = body else {
            return Err(AppError::invalid_field("body", "Expected a JSON object."));
        };

        let mut errors = FieldMessages::new();
        T::check_types(&mut body, &mut errors);

        let value: T = serde_json::from_value(Value::Object(body))
            .map_err(|e| AppError::invalid_field("body", e.to_string()))?;

        if let Err(e) = value.validate() {
            add_field_messages(&mut errors, e);
        }

        Ok(Self { value, errors })
    }
}

/// JSON body extractor rejecting with [`AppError`].
///
/// The body is type-checked and validated; any field error rejects the
/// request with a single `validation-error` listing every offending field.
#[derive(Debug)]
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned + Validate + FieldTypes,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let CheckedJson { value, errors } = CheckedJson::<T>::from_request(req, state).await?;

        if !errors.is_empty() {
            return Err(AppError::Validation { messages: errors });
        }

        Ok(Self(value))
    }
}

/// Query string extractor rejecting with [`AppError`].
#[derive(Debug)]
pub struct ApiQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

/// The token that authenticated the current request.
///
/// Inserted into request extensions by
/// [`crate::api::middleware::auth::layer`]. Using this extractor on a route
/// without that layer is a wiring bug and fails as `invalid-token`.
#[derive(Debug, Clone)]
pub struct Caller(pub Token);

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Token>()
            .cloned()
            .map(Caller)
            .ok_or(AppError::InvalidToken)
    }
}
