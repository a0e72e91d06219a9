//! DTOs for the token endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use serde_with::serde_as;
use uuid::Uuid;
use validator::Validate;

use crate::api::extract::{FieldTypes, check_field};
use crate::domain::entities::{Token, TokenFilter, TokenPatch};
use crate::error::FieldMessages;
use crate::utils::url_validator::validate_callback_url;

/// Request body for `POST /tokens/`.
///
/// `name` is optional at the schema level so its absence can be reported as
/// `missing-args` rather than a decoding failure.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTokenRequest {
    pub name: Option<String>,

    #[serde(default)]
    pub is_admin: bool,

    #[serde(default)]
    pub is_blocked: bool,

    #[validate(custom(function = "validate_callback_url"))]
    pub callback_url: Option<String>,
}

impl FieldTypes for CreateTokenRequest {
    fn check_types(body: &mut Map<String, Value>, errors: &mut FieldMessages) {
        check_field::<Option<String>>(body, "name", "name", errors);
        check_field::<bool>(body, "is_admin", "is_admin", errors);
        check_field::<bool>(body, "is_blocked", "is_blocked", errors);
        check_field::<Option<String>>(body, "callback_url", "callback_url", errors);
    }
}

/// Request body for `PATCH /tokens/{api_key}`.
///
/// `name` is immutable and not part of this struct; a `name` in the body is
/// dropped during deserialization.
///
/// # `callback_url` semantics
///
/// - **Absent** → leave unchanged
/// - **`null`** → clear
/// - **URL** → set
#[serde_as]
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTokenRequest {
    pub is_admin: Option<bool>,

    pub is_blocked: Option<bool>,

    #[serde(default, with = "::serde_with::rust::double_option")]
    #[validate(custom(function = "validate_callback_url"))]
    pub callback_url: Option<Option<String>>,
}

impl FieldTypes for UpdateTokenRequest {
    fn check_types(body: &mut Map<String, Value>, errors: &mut FieldMessages) {
        check_field::<Option<bool>>(body, "is_admin", "is_admin", errors);
        check_field::<Option<bool>>(body, "is_blocked", "is_blocked", errors);
        check_field::<Option<String>>(body, "callback_url", "callback_url", errors);
    }
}

impl From<UpdateTokenRequest> for TokenPatch {
    fn from(req: UpdateTokenRequest) -> Self {
        TokenPatch {
            is_admin: req.is_admin,
            is_blocked: req.is_blocked,
            callback_url: req.callback_url,
        }
    }
}

/// Query parameters for `GET /tokens/`. Every given field must match.
#[derive(Debug, Default, Deserialize)]
pub struct TokenListQuery {
    pub name: Option<String>,
    pub is_admin: Option<bool>,
    pub is_blocked: Option<bool>,
    pub callback_url: Option<String>,
}

impl From<TokenListQuery> for TokenFilter {
    fn from(q: TokenListQuery) -> Self {
        TokenFilter {
            name: q.name,
            is_admin: q.is_admin,
            is_blocked: q.is_blocked,
            callback_url: q.callback_url,
        }
    }
}

/// Token representation returned by every token endpoint.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub api_key: Uuid,
    pub name: String,
    pub is_admin: bool,
    pub is_blocked: bool,
    pub token_uses: i64,
    pub last_access: DateTime<Utc>,
    pub callback_url: Option<String>,
}

impl From<Token> for TokenResponse {
    fn from(token: Token) -> Self {
        Self {
            api_key: token.api_key,
            name: token.name,
            is_admin: token.is_admin,
            is_blocked: token.is_blocked,
            token_uses: token.token_uses,
            last_access: token.last_access,
            callback_url: token.callback_url,
        }
    }
}
