//! Shortcut generation and validation.
//!
//! Two alphabets are in play:
//!
//! - [`ALPHABET_RESTRICTED`] for generated shortcuts. It drops vowels and
//!   visually confusable characters (`0`, `O`, `1`, `l`, `I`, ...), so a
//!   generated shortcut is easy to read aloud and never spells a word.
//! - [`ALPHABET_MANUAL`] for caller-specified shortcuts: ASCII alphanumerics
//!   plus `-`.

use std::collections::HashSet;
use std::sync::LazyLock;

use rand::Rng;
use regex::Regex;
use validator::ValidationError;

/// Characters allowed in caller-specified shortcuts.
pub const ALPHABET_MANUAL: &str =
    "0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ-";

/// Characters used for generated shortcuts.
pub const ALPHABET_RESTRICTED: &str = "23456789bcdfghjkmnpqrstvwxyzBCDFGHJKLMNPQRSTVWXYZ";

/// Upper bound on the length of a caller-specified shortcut.
pub const MAX_MANUAL_LENGTH: usize = 255;

/// Path segments owned by the service itself.
///
/// A shortcut equal to one of these would be shadowed by the route.
pub const RESERVED_SHORTCUTS: &[&str] = &["tokens", "urls", "health"];

static MANUAL_SHORTCUT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9A-Za-z-]+$").expect("static regex is valid"));

/// Generation and validation rules for shortcuts, built from configuration.
#[derive(Debug, Clone)]
pub struct ShortcutPolicy {
    length: usize,
    blacklist: HashSet<String>,
}

impl ShortcutPolicy {
    pub fn new(length: usize, blacklist: HashSet<String>) -> Self {
        Self { length, blacklist }
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn is_blacklisted(&self, shortcut: &str) -> bool {
        self.blacklist.contains(shortcut)
    }

    /// Draws one random candidate of the configured length.
    ///
    /// The candidate may still collide with a stored shortcut; uniqueness is
    /// decided by the insert.
    pub fn generate(&self) -> String {
        generate_shortcut(self.length)
    }

    /// Checks a generated candidate against the blacklist and reserved routes.
    pub fn accepts_generated(&self, candidate: &str) -> bool {
        is_restricted(candidate) && !is_reserved(candidate) && !self.is_blacklisted(candidate)
    }

    /// Validates a caller-specified shortcut.
    ///
    /// # Rules
    ///
    /// - 1 to [`MAX_MANUAL_LENGTH`] characters from [`ALPHABET_MANUAL`]
    /// - Not a reserved route segment
    /// - Not blacklisted
    pub fn validate_manual(&self, shortcut: &str) -> Result<(), ValidationError> {
        if shortcut.is_empty() || shortcut.len() > MAX_MANUAL_LENGTH {
            return Err(invalid_shortcut(
                "length",
                format!("Shortcut must be 1-{MAX_MANUAL_LENGTH} characters"),
            ));
        }

        if !MANUAL_SHORTCUT_REGEX.is_match(shortcut) {
            return Err(invalid_shortcut(
                "alphabet",
                "Shortcut can only contain letters, digits and hyphens".to_string(),
            ));
        }

        if is_reserved(shortcut) {
            return Err(invalid_shortcut(
                "reserved",
                "Shortcut collides with a system route".to_string(),
            ));
        }

        if self.is_blacklisted(shortcut) {
            return Err(invalid_shortcut(
                "blacklisted",
                "Shortcut is not allowed".to_string(),
            ));
        }

        Ok(())
    }
}

fn invalid_shortcut(code: &'static str, message: String) -> ValidationError {
    ValidationError::new(code).with_message(message.into())
}

/// Generates a random shortcut of `length` characters from [`ALPHABET_RESTRICTED`].
pub fn generate_shortcut(length: usize) -> String {
    let alphabet = ALPHABET_RESTRICTED.as_bytes();
    let mut rng = rand::rng();

    (0..length)
        .map(|_| alphabet[rng.random_range(0..alphabet.len())] as char)
        .collect()
}

/// Returns `true` if every character belongs to [`ALPHABET_RESTRICTED`].
pub fn is_restricted(shortcut: &str) -> bool {
    !shortcut.is_empty() && shortcut.chars().all(|c| ALPHABET_RESTRICTED.contains(c))
}

/// Returns `true` if the shortcut is a reserved route segment.
pub fn is_reserved(shortcut: &str) -> bool {
    RESERVED_SHORTCUTS.contains(&shortcut)
}
