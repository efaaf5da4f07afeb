//! Slug generation
//!
//! A slug is the lowercase, hyphen-joined, URL-safe form of a title or name.
//! Only ASCII letters, digits and `_` survive; whitespace, `_` and `-` runs
//! collapse into one `-`, and hyphens are trimmed from both ends.

use once_cell::sync::Lazy;
use regex::Regex;

static DISALLOWED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9_\s-]").expect("valid slug regex"));
static SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s_-]+").expect("valid slug regex"));

/// Derive a slug from free text.
///
/// ```
/// use nextpress::utils::generate_slug;
///
/// assert_eq!(generate_slug("Hello, World!"), "hello-world");
/// assert_eq!(generate_slug("  Rust_and   SQL -- tips "), "rust-and-sql-tips");
/// ```
pub fn generate_slug(text: &str) -> String {
    let lowered = text.trim().to_lowercase();
    let stripped = DISALLOWED.replace_all(&lowered, "");
    let joined = SEPARATORS.replace_all(&stripped, "-");
    joined.trim_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_titles() {
        assert_eq!(generate_slug("My First Post"), "my-first-post");
        assert_eq!(generate_slug("Hello, World!"), "hello-world");
        assert_eq!(generate_slug("Rust 2024: What's New?"), "rust-2024-whats-new");
    }

    #[test]
    fn test_separator_runs_collapse() {
        assert_eq!(generate_slug("a  -  b__c"), "a-b-c");
        assert_eq!(generate_slug("--leading and trailing--"), "leading-and-trailing");
    }

    #[test]
    fn test_non_ascii_is_dropped() {
        assert_eq!(generate_slug("Café Crème"), "caf-crme");
        assert_eq!(generate_slug("日本語"), "");
    }

    #[test]
    fn test_punctuation_only_yields_empty() {
        assert_eq!(generate_slug("!!! ???"), "");
        assert_eq!(generate_slug(""), "");
    }
}
