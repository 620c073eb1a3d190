//! Short code and destination URL validation rules.
//!
//! These rules are shared by the registry (before any storage access) and by
//! the redirect resolver (to answer malformed codes without a lookup).

use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;
use url::Url;
use validator::ValidationError;

/// Minimum short code length, in characters.
pub const MIN_CODE_LEN: u64 = 3;

/// Maximum short code length, in characters.
pub const MAX_CODE_LEN: u64 = 20;

/// Allowed short code alphabet.
pub static SHORT_CODE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").unwrap());

/// Codes that collide with top-level routes and would never resolve.
const RESERVED_CODES: &[&str] = &["api", "health"];

/// Returns true if `code` could name a persisted link.
///
/// Used by the resolver to skip storage for requests that cannot match.
pub fn is_well_formed(code: &str) -> bool {
    let len = code.chars().count() as u64;
    (MIN_CODE_LEN..=MAX_CODE_LEN).contains(&len) && SHORT_CODE_REGEX.is_match(code)
}

/// Rejects codes reserved for system routes. Routes match case-sensitively,
/// so only the exact spellings are reserved.
pub fn validate_not_reserved(code: &str) -> Result<(), ValidationError> {
    if RESERVED_CODES.contains(&code) {
        return Err(ValidationError::new("reserved")
            .with_message(Cow::Borrowed("This short code is reserved")));
    }
    Ok(())
}

/// Accepts only syntactically valid absolute URLs that can be sent verbatim
/// in a `Location` header.
pub fn validate_absolute_url(value: &str) -> Result<(), ValidationError> {
    let invalid =
        || ValidationError::new("url").with_message(Cow::Borrowed("Please enter a valid URL"));

    if value.is_empty() || value.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(invalid());
    }

    Url::parse(value).map(|_| ()).map_err(|_| invalid())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_formed_codes() {
        assert!(is_well_formed("abc"));
        assert!(is_well_formed("demo"));
        assert!(is_well_formed("mdn-js"));
        assert!(is_well_formed("A_b-9"));
        assert!(is_well_formed("abcdefghijklmnopqrst"));
    }

    #[test]
    fn test_malformed_codes() {
        assert!(!is_well_formed("ab"));
        assert!(!is_well_formed("abcdefghijklmnopqrstu"));
        assert!(!is_well_formed("de@mo"));
        assert!(!is_well_formed("with space"));
        assert!(!is_well_formed("café"));
        assert!(!is_well_formed(""));
    }

    #[test]
    fn test_reserved_codes() {
        assert!(validate_not_reserved("api").is_err());
        assert!(validate_not_reserved("health").is_err());
        assert!(validate_not_reserved("apis").is_ok());
        assert!(validate_not_reserved("API").is_ok());
        assert!(validate_not_reserved("Health").is_ok());
    }

    #[test]
    fn test_absolute_urls() {
        assert!(validate_absolute_url("https://example.com").is_ok());
        assert!(validate_absolute_url("http://localhost:8080/path?q=1#frag").is_ok());
        assert!(validate_absolute_url("ftp://files.example.com/a.txt").is_ok());
    }

    #[test]
    fn test_rejected_urls() {
        assert!(validate_absolute_url("not-a-url").is_err());
        assert!(validate_absolute_url("/relative/path").is_err());
        assert!(validate_absolute_url("").is_err());
        assert!(validate_absolute_url(" https://example.com").is_err());
        assert!(validate_absolute_url("https://exa\nmple.com").is_err());
        assert!(validate_absolute_url("https://").is_err());
    }
}
