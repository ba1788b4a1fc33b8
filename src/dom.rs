//! Element lookup through a host-provided document
//!
//! Turns phrases like "with class active" into a CSS-style selector and runs
//! it against a [`Document`] when the host has one.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::{ErrorKind, ErrorResult, Value};

static CLASS_PHRASE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bclass\s+([a-zA-Z0-9_-]+)").expect("Invalid regex pattern"));
static ID_PHRASE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bid\s+([a-zA-Z0-9_-]+)").expect("Invalid regex pattern"));
static FILLER_WORDS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:elements?|with|the)\b").expect("Invalid regex pattern"));

/// A queryable document supplied by the host
pub trait Document: Send + Sync {
    /// Run a selector query, returning matched elements or a description of
    /// why the selector was rejected.
    fn query_selector_all(&self, selector: &str) -> Result<Vec<Value>, String>;
}

/// Translate a natural-language fragment into selector syntax.
///
/// `class foo` becomes `.foo`, `id bar` becomes `#bar`, filler words are
/// dropped and whitespace is collapsed.
pub fn translate_selector(fragment: &str) -> String {
    let selector = CLASS_PHRASE.replace_all(fragment, ".${1}");
    let selector = ID_PHRASE.replace_all(&selector, "#${1}");
    let selector = FILLER_WORDS.replace_all(&selector, "");
    selector.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Find elements matching `fragment`, or report that no document is available.
pub fn find_elements(
    fragment: &str,
    document: Option<&dyn Document>,
) -> Result<Value, ErrorResult> {
    let selector = translate_selector(fragment);
    tracing::debug!(fragment, %selector, "translated element selector");

    let Some(document) = document else {
        return Err(ErrorResult::new(ErrorKind::DomUnavailable, "DOM not available"));
    };

    document
        .query_selector_all(&selector)
        .map(Value::Array)
        .map_err(|e| {
            ErrorResult::new(ErrorKind::InvalidSelector, format!("Invalid selector: {}", e))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedDocument;

    impl Document for FixedDocument {
        fn query_selector_all(&self, selector: &str) -> Result<Vec<Value>, String> {
            match selector {
                ".active" => Ok(vec![Value::from("<li class=\"active\">")]),
                "" => Err("empty selector".to_string()),
                _ => Ok(Vec::new()),
            }
        }
    }

    #[test]
    fn test_translate_class_and_id() {
        assert_eq!(translate_selector("class active"), ".active");
        assert_eq!(translate_selector("id main-nav"), "#main-nav");
        assert_eq!(translate_selector("div with class card and id hero"), "div .card and #hero");
    }

    #[test]
    fn test_translate_strips_filler_words() {
        assert_eq!(translate_selector("the elements with class x"), ".x");
        // Whole words only
        assert_eq!(translate_selector("thead"), "thead");
        assert_eq!(translate_selector("valid"), "valid");
    }

    #[test]
    fn test_no_document() {
        let err = find_elements("class active", None).expect_err("no document");
        assert_eq!(err.kind, ErrorKind::DomUnavailable);
        assert_eq!(err.message, "DOM not available");
    }

    #[test]
    fn test_query_document() {
        let doc = FixedDocument;
        let found = find_elements("with class active", Some(&doc)).expect("query runs");
        assert_eq!(found, Value::Array(vec![Value::from("<li class=\"active\">")]));
    }

    #[test]
    fn test_rejected_selector() {
        let doc = FixedDocument;
        let err = find_elements("the elements", Some(&doc)).expect_err("empty selector");
        assert_eq!(err.kind, ErrorKind::InvalidSelector);
        assert_eq!(err.message, "Invalid selector: empty selector");
    }
}
