//! Token entity representing an API credential.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// An API token.
///
/// The `api_key` is the bearer credential. `name` is a unique, human-readable
/// label fixed at creation. Tokens own the URLs created with them.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub id: i64,
    pub api_key: Uuid,
    pub name: String,
    pub is_admin: bool,
    pub is_blocked: bool,
    pub token_uses: i64,
    pub last_access: DateTime<Utc>,
    pub callback_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Token {
    pub fn role(&self) -> &'static str {
        if self.is_admin { "admin" } else { "user" }
    }
}

/// Input data for creating a new token.
///
/// The `api_key` is generated by the caller so it can be logged and returned
/// without a second lookup.
#[derive(Debug, Clone)]
pub struct NewToken {
    pub api_key: Uuid,
    pub name: String,
    pub is_admin: bool,
    pub is_blocked: bool,
    pub callback_url: Option<String>,
}

/// Partial update for an existing token.
///
/// Only these fields are mutable; `name` and `api_key` are fixed for the
/// lifetime of a token. `callback_url: Some(None)` clears the callback.
#[derive(Debug, Clone, Default)]
pub struct TokenPatch {
    pub is_admin: Option<bool>,
    pub is_blocked: Option<bool>,
    pub callback_url: Option<Option<String>>,
}

/// Filter for listing tokens. Provided fields are combined with AND;
/// an empty filter matches every token.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenFilter {
    pub name: Option<String>,
    pub is_admin: Option<bool>,
    pub is_blocked: Option<bool>,
    pub callback_url: Option<String>,
}
