//! Field validators for target and callback URLs.
//!
//! Both return [`ValidationError`] so they plug into `#[validate(custom(...))]`
//! and aggregate with every other field error of a request.

use url::Url;
use validator::ValidationError;

/// Parses `value` as an absolute URL with a scheme and a host.
///
/// Rejects empty strings, relative references (`/path`, `example.com`) and
/// host-less URLs such as `mailto:` or `data:`.
pub fn parse_absolute_url(value: &str) -> Option<Url> {
    let url = Url::parse(value.trim()).ok()?;
    url.has_host().then_some(url)
}

/// Validates a shortcut target URL.
pub fn validate_target_url(value: &str) -> Result<(), ValidationError> {
    match parse_absolute_url(value) {
        Some(_) => Ok(()),
        None => Err(ValidationError::new("url").with_message("Not a valid URL.".into())),
    }
}

/// Validates a token callback URL: absolute and HTTP(S) only.
pub fn validate_callback_url(value: &str) -> Result<(), ValidationError> {
    match parse_absolute_url(value) {
        Some(url) if matches!(url.scheme(), "http" | "https") => Ok(()),
        _ => Err(ValidationError::new("url").with_message("Not a valid URL.".into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_url_accepts_absolute_urls() {
        assert!(validate_target_url("http://example.com").is_ok());
        assert!(validate_target_url("https://example.com/a/b?c=d#e").is_ok());
        assert!(validate_target_url("ftp://files.example.com/pub").is_ok());
    }

    #[test]
    fn test_target_url_rejects_scheme_less_and_empty() {
        for value in ["", "   ", "example.com", "/relative/path", "fake"] {
            assert!(validate_target_url(value).is_err(), "{value:?}");
        }
    }

    #[test]
    fn test_target_url_rejects_host_less_schemes() {
        assert!(validate_target_url("mailto:someone@example.com").is_err());
        assert!(validate_target_url("data:text/plain,hi").is_err());
    }

    #[test]
    fn test_callback_url_requires_http() {
        assert!(validate_callback_url("http://cern.ch").is_ok());
        assert!(validate_callback_url("https://cern.ch/hook").is_ok());
        assert!(validate_callback_url("ftp://cern.ch").is_err());
        assert!(validate_callback_url("fake").is_err());
    }

    #[test]
    fn test_error_message() {
        let err = validate_target_url("fake").unwrap_err();
        assert_eq!(err.message.as_deref(), Some("Not a valid URL."));
    }
}
