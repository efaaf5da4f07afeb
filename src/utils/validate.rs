//! Input normalization helpers

use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

/// Trim a submitted field, treating blank input as absent
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Shallow address check: `local@domain.tld` with no whitespace
pub fn is_valid_email(email: &str) -> bool {
    EMAIL.is_match(email.trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(None), None);
        assert_eq!(non_blank(Some("   ".into())), None);
        assert_eq!(non_blank(Some(" hi ".into())), Some("hi".to_string()));
    }

    #[test]
    fn test_email_shapes() {
        assert!(is_valid_email("reader@example.com"));
        assert!(is_valid_email(" first.last+tag@mail.example.org "));
        assert!(!is_valid_email("reader@localhost"));
        assert!(!is_valid_email("no-at-sign.example.com"));
        assert!(!is_valid_email("two words@example.com"));
        assert!(!is_valid_email(""));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(20))]

        #[test]
        fn non_blank_output_is_trimmed(input in ".{0,40}") {
            if let Some(out) = non_blank(Some(input)) {
                prop_assert!(!out.is_empty());
                prop_assert_eq!(out.trim(), out.as_str());
            }
        }
    }
}
