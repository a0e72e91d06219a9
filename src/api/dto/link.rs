//! DTOs for the URL endpoints.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

use crate::api::extract::{FieldTypes, check_field};
use crate::application::services::LinkDraft;
use crate::domain::entities::{Link, LinkPatch, Meta};
use crate::error::{AppError, FieldMessages};
use crate::utils::url_validator::validate_target_url;

/// Request body for `POST /urls/` and `PUT /urls/{shortcut}`.
///
/// `metadata` is accepted as an alias of `meta`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateLinkRequest {
    #[validate(custom(function = "validate_target_url"))]
    pub url: Option<String>,

    #[serde(default, alias = "metadata")]
    pub meta: Meta,

    #[serde(default)]
    pub allow_reuse: bool,
}

impl FieldTypes for CreateLinkRequest {
    fn check_types(body: &mut Map<String, Value>, errors: &mut FieldMessages) {
        check_field::<Option<String>>(body, "url", "url", errors);
        check_field::<Meta>(body, "meta", "meta", errors);
        check_field::<Meta>(body, "metadata", "meta", errors);
        check_field::<bool>(body, "allow_reuse", "allow_reuse", errors);
    }
}

impl CreateLinkRequest {
    /// Turns a validated request into a [`LinkDraft`].
    ///
    /// # Errors
    ///
    /// Returns [`AppError::MissingArgs`] if `url` is absent.
    pub fn into_draft(self) -> Result<LinkDraft, AppError> {
        let url = self
            .url
            .ok_or_else(|| AppError::missing_args("URL missing", &["url"]))?;

        Ok(LinkDraft {
            url: url.trim().to_string(),
            meta: self.meta,
            allow_reuse: self.allow_reuse,
        })
    }
}

/// Request body for `PATCH /urls/{shortcut}`.
///
/// The shortcut is immutable. `meta` replaces the stored map as a whole.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateLinkRequest {
    #[validate(custom(function = "validate_target_url"))]
    pub url: Option<String>,

    #[serde(alias = "metadata")]
    pub meta: Option<Meta>,
}

impl FieldTypes for UpdateLinkRequest {
    fn check_types(body: &mut Map<String, Value>, errors: &mut FieldMessages) {
        check_field::<Option<String>>(body, "url", "url", errors);
        check_field::<Option<Meta>>(body, "meta", "meta", errors);
        check_field::<Option<Meta>>(body, "metadata", "meta", errors);
    }
}

impl From<UpdateLinkRequest> for LinkPatch {
    fn from(req: UpdateLinkRequest) -> Self {
        LinkPatch {
            url: req.url.map(|u| u.trim().to_string()),
            meta: req.meta,
        }
    }
}

/// Query parameters for `GET /urls/`.
///
/// Metadata filters use one parameter per key, `meta.<key>=<value>` (or
/// `metadata.<key>=<value>`), and are matched as string values.
#[derive(Debug, Default, PartialEq)]
pub struct LinkListQuery {
    pub all: bool,
    pub url: Option<String>,
    pub meta: Meta,
}

impl TryFrom<Vec<(String, String)>> for LinkListQuery {
    type Error = AppError;

    fn try_from(pairs: Vec<(String, String)>) -> Result<Self, Self::Error> {
        let mut query = LinkListQuery::default();

        for (key, value) in pairs {
            if let Some(meta_key) = key
                .strip_prefix("meta.")
                .or_else(|| key.strip_prefix("metadata."))
            {
                query.meta.insert(meta_key.to_string(), Value::String(value));
                continue;
            }

            match key.as_str() {
                "url" => query.url = Some(value),
                "all" => {
                    query.all = parse_flag(&value)
                        .ok_or_else(|| AppError::invalid_field("all", "Not a valid boolean."))?;
                }
                _ => {}
            }
        }

        Ok(query)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// URL representation returned by every URL endpoint.
#[derive(Debug, Serialize)]
pub struct LinkResponse {
    pub shortcut: String,
    pub url: String,
    pub short_url: String,
    pub meta: Meta,
    pub owner: String,
    pub is_custom: bool,
}

impl LinkResponse {
    pub fn from_link(link: Link, redirection_host: &str) -> Self {
        Self {
            short_url: link.short_url(redirection_host),
            shortcut: link.shortcut,
            url: link.url,
            meta: link.meta,
            owner: link.owner,
            is_custom: link.is_custom,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_create_request_accepts_metadata_alias() {
        let req: CreateLinkRequest = serde_json::from_value(json!({
            "url": "http://example.com",
            "metadata": {"a": "x"}
        }))
        .unwrap();

        assert_eq!(req.meta.get("a"), Some(&json!("x")));
        assert!(!req.allow_reuse);
    }

    #[test]
    fn test_create_request_invalid_url() {
        let req: CreateLinkRequest = serde_json::from_value(json!({"url": "fake"})).unwrap();

        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("url"));
    }

    #[test]
    fn test_check_types_drops_bad_fields() {
        let mut body = json!({
            "url": "http://example.com",
            "metadata": "not-a-map",
            "allow_reuse": 1
        })
        .as_object()
        .cloned()
        .unwrap();
        let mut errors = FieldMessages::new();

        CreateLinkRequest::check_types(&mut body, &mut errors);

        assert_eq!(errors.keys().collect::<Vec<_>>(), ["allow_reuse", "meta"]);
        assert_eq!(body.keys().collect::<Vec<_>>(), ["url"]);
        let req: CreateLinkRequest = serde_json::from_value(Value::Object(body)).unwrap();
        assert!(req.meta.is_empty());
    }

    #[test]
    fn test_into_draft_requires_url() {
        let req: CreateLinkRequest = serde_json::from_value(json!({"meta": {}})).unwrap();

        assert!(matches!(
            req.into_draft(),
            Err(AppError::MissingArgs { .. })
        ));
    }

    #[test]
    fn test_list_query_collects_meta_filters() {
        let query = LinkListQuery::try_from(pairs(&[
            ("all", "true"),
            ("meta.a", "x"),
            ("metadata.b", "y"),
            ("url", "http://example.com"),
            ("unrelated", "z"),
        ]))
        .unwrap();

        assert!(query.all);
        assert_eq!(query.url.as_deref(), Some("http://example.com"));
        assert_eq!(query.meta.len(), 2);
        assert_eq!(query.meta.get("b"), Some(&json!("y")));
    }

    #[test]
    fn test_list_query_rejects_bad_flag() {
        let result = LinkListQuery::try_from(pairs(&[("all", "maybe")]));

        assert!(matches!(result, Err(AppError::Validation { .. })));
    }

    #[test]
    fn test_response_has_short_url_and_owner() {
        let link = Link {
            id: 1,
            shortcut: "abc".to_string(),
            url: "http://example.com".to_string(),
            is_custom: false,
            meta: Meta::new(),
            token_id: 2,
            owner: "bob".to_string(),
            created_at: Utc::now(),
        };

        let response = LinkResponse::from_link(link, "https://s.example.com/");

        assert_eq!(response.short_url, "https://s.example.com/abc");
        assert_eq!(response.owner, "bob");
    }
}
