//! Link entity representing a shortcut-to-URL mapping.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use super::Token;

/// Free-form key/value metadata attached to a link.
pub type Meta = Map<String, Value>;

/// A shortcut and the URL it redirects to.
///
/// `owner` is the name of the owning token, joined in on every read.
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub id: i64,
    pub shortcut: String,
    pub url: String,
    pub is_custom: bool,
    pub meta: Meta,
    pub token_id: i64,
    pub owner: String,
    pub created_at: DateTime<Utc>,
}

impl Link {
    /// Returns true if `token` may modify this link: its owner, or any admin.
    pub fn is_writable_by(&self, token: &Token) -> bool {
        token.is_admin || self.token_id == token.id
    }

    /// Builds the public short URL below `redirection_host`.
    pub fn short_url(&self, redirection_host: &str) -> String {
        format!(
            "{}/{}",
            redirection_host.trim_end_matches('/'),
            self.shortcut
        )
    }
}

/// Input data for creating a new link.
#[derive(Debug, Clone)]
pub struct NewLink {
    pub shortcut: String,
    pub url: String,
    pub is_custom: bool,
    pub meta: Meta,
    pub token_id: i64,
}

/// Partial update for an existing link.
///
/// The shortcut itself is immutable. `meta`, when present, replaces the
/// stored map as a whole.
#[derive(Debug, Clone, Default)]
pub struct LinkPatch {
    pub url: Option<String>,
    pub meta: Option<Meta>,
}

impl LinkPatch {
    pub fn is_empty(&self) -> bool {
        self.url.is_none() && self.meta.is_none()
    }
}

/// Filter for listing links.
///
/// `meta` is a containment test: every pair in it must be present in the
/// stored metadata. An empty map matches everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkFilter {
    pub token_id: Option<i64>,
    pub url: Option<String>,
    pub meta: Meta,
}
