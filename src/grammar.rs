//! Hashtag name grammar.
//!
//! A name is one or more word characters containing at least one letter,
//! underscore or middle dot. In text, a hashtag is a `#` followed by such a
//! name, where the `#` is at the start of the text or preceded by a
//! character that is neither a word character, `/` nor `)`.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Result, TagError};

/// Pattern for a single hashtag name, without anchors.
pub const HASHTAG_NAME_RE: &str = r"[\w_]*[\p{Alphabetic}_·][\w_]*";

static NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)\A{HASHTAG_NAME_RE}\z")).expect("hashtag name pattern is valid")
});

static HASHTAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)(?:^|[^/)\w])#({HASHTAG_NAME_RE})"))
        .expect("hashtag pattern is valid")
});

/// Checks a tag name against the hashtag grammar.
///
/// # Errors
///
/// Returns [`TagError::Validation`] for empty names and names that do not
/// match the grammar. Names are never corrected.
///
/// # Examples
///
/// ```
/// use hashtags::grammar::validate_name;
///
/// assert!(validate_name("rust").is_ok());
/// assert!(validate_name("_").is_ok());
/// assert!(validate_name("2024").is_err());
/// assert!(validate_name("").is_err());
/// ```
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(TagError::Validation {
            name: name.to_string(),
            reason: "can't be blank",
        });
    }

    if !NAME_RE.is_match(name) {
        return Err(TagError::Validation {
            name: name.to_string(),
            reason: "must be word characters with at least one letter or underscore",
        });
    }

    Ok(())
}

/// Returns the case-folded form used for uniqueness and prefix search.
#[must_use]
pub fn normalize_name(name: &str) -> String {
    name.to_lowercase()
}

/// Extracts hashtag names from free text.
///
/// Names come back without the leading `#`, in order of first appearance,
/// deduplicated case-insensitively (the first spelling wins).
///
/// # Examples
///
/// ```
/// use hashtags::grammar::extract_hashtags;
///
/// let tags = extract_hashtags("Hello #Rust and #rust, see https://x.org/#anchor");
/// assert_eq!(tags, vec!["Rust"]);
/// ```
#[must_use]
pub fn extract_hashtags(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    HASHTAG_RE
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .filter(|name| seen.insert(normalize_name(name)))
        .collect()
}

/// Escapes `LIKE` wildcards so user input only matches literally.
///
/// The result is meant for a pattern declared with `ESCAPE '\'`.
#[must_use]
pub fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
