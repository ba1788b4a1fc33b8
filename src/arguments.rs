//! Argument coercion from free text into typed values
//!
//! Best-effort and heuristic: bare identifiers pass through, unquoted text is
//! treated as a string, and everything else goes through the JSON literal
//! parser. Never fails.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::Value;

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_]*$").expect("Invalid regex pattern"));

const KEYWORDS: [&str; 3] = ["true", "false", "null"];

/// One coerced argument token
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedArgument {
    /// A bare name such as `Alice` or `user_id`, kept as written. Not looked up
    /// in the context.
    Identifier(String),
    /// A string, number, boolean or null literal.
    Literal(Value),
    /// Text the literal parser rejected, kept as written.
    Raw(String),
}

impl ParsedArgument {
    pub fn into_value(self) -> Value {
        match self {
            ParsedArgument::Identifier(name) => Value::String(name),
            ParsedArgument::Literal(value) => value,
            ParsedArgument::Raw(text) => Value::String(text),
        }
    }
}

/// Split `args_text` on commas and coerce each trimmed token.
///
/// Always yields one argument per comma-delimited token, in order. An empty
/// string yields a single empty raw token.
pub fn coerce(args_text: &str) -> Vec<ParsedArgument> {
    let parsed: Vec<ParsedArgument> = args_text
        .split(',')
        .map(|token| coerce_token(token.trim()))
        .collect();
    tracing::debug!(input = args_text, ?parsed, "coerced arguments");
    parsed
}

/// Coerce a single token.
pub fn coerce_token(token: &str) -> ParsedArgument {
    let is_keyword = KEYWORDS.contains(&token);

    if !is_keyword && IDENTIFIER.is_match(token) {
        return ParsedArgument::Identifier(token.to_string());
    }

    let candidate: Cow<'_, str> = if !is_keyword
        && !token.starts_with('"')
        && !token.starts_with('\'')
        && !looks_numeric(token)
    {
        Cow::Owned(format!("\"{}\"", token))
    } else {
        Cow::Borrowed(token)
    };

    match serde_json::from_str::<serde_json::Value>(&candidate) {
        Ok(json) => ParsedArgument::Literal(Value::from(json)),
        Err(_) => ParsedArgument::Raw(token.to_string()),
    }
}

/// Loose numeric check; blank text counts as numeric so it is never quoted.
fn looks_numeric(token: &str) -> bool {
    token.is_empty() || token.parse::<f64>().is_ok_and(|n| !n.is_nan())
}
