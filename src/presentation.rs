//! Presentation of command results
//!
//! The interpreter reports every processed command to a [`PresentationSink`]
//! exactly once. The sink's behaviour never feeds back into the result.

use crate::error::TalkError;
use crate::types::{Outcome, Value};

/// Receives every processed command for display
pub trait PresentationSink: Send + Sync {
    /// A command matched `intent` and produced `outcome`.
    fn present(&self, command: &str, intent: &str, outcome: &Outcome);

    /// No intent matched `command`.
    fn unrecognized(&self, command: &str);

    /// The command or a context update was rejected before processing.
    fn rejected(&self, error: &TalkError);
}

/// Render an outcome as human-readable text.
///
/// Errors list their suggestions, arrays are counted and listed one per line,
/// objects are pretty-printed JSON, anything else is shown plainly.
pub fn render(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Error(err) => {
            let mut text = format!("Error: {}", err.message);
            if !err.suggestions.is_empty() {
                text.push_str("\nDid you mean one of these?");
                for suggestion in &err.suggestions {
                    text.push_str("\n  ");
                    text.push_str(suggestion);
                }
            }
            text
        }
        Outcome::Value(Value::Array(items)) => {
            let mut text = format!("Found {} results:", items.len());
            for (index, item) in items.iter().enumerate() {
                text.push_str(&format!("\n  [{}] {}", index, item));
            }
            text
        }
        Outcome::Value(value @ (Value::Object(_) | Value::Host(_))) => {
            let body = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
            format!("Result:\n{}", body)
        }
        Outcome::Value(value) => format!("Result: {}", value),
    }
}

/// Sink that writes rendered results as `tracing` events
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl PresentationSink for TracingSink {
    fn present(&self, command: &str, intent: &str, outcome: &Outcome) {
        let span = tracing::info_span!("talk", command, intent);
        let _enter = span.enter();

        if outcome.is_error() {
            tracing::error!("{}", render(outcome));
        } else {
            tracing::info!("{}", render(outcome));
        }
    }

    fn unrecognized(&self, command: &str) {
        tracing::warn!("I'm not sure how to process: \"{}\"", command);
        tracing::info!(
            r#"Try phrases like: "what is myVariable" or "call myFunction with param1""#
        );
    }

    fn rejected(&self, error: &TalkError) {
        tracing::error!("{}", error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ErrorKind, ErrorResult, FunctionError, HostObject};

    struct Loop;

    impl HostObject for Loop {
        fn keys(&self) -> Vec<String> {
            vec!["next".to_string()]
        }

        fn get(&self, key: &str) -> Result<Option<Value>, FunctionError> {
            Ok((key == "next").then(|| Value::host(Loop)))
        }
    }

    #[test]
    fn test_render_scalar() {
        assert_eq!(render(&Outcome::Value(Value::Int(42))), "Result: 42");
        assert_eq!(render(&Outcome::Value(Value::from("John"))), "Result: John");
    }

    #[test]
    fn test_render_array() {
        let outcome = Outcome::Value(Value::Array(vec![Value::Int(1), Value::from("two")]));
        assert_eq!(render(&outcome), "Found 2 results:\n  [0] 1\n  [1] two");
    }

    #[test]
    fn test_render_object() {
        let outcome = Outcome::Value(Value::object([("age", Value::Int(30))]));
        assert_eq!(render(&outcome), "Result:\n{\n  \"age\": 30\n}");
    }

    #[test]
    fn test_render_error_with_suggestions() {
        let outcome = Outcome::Error(
            ErrorResult::new(ErrorKind::UnresolvedPath, "Property \"countr\" not found")
                .with_suggestions(vec!["counter".to_string()]),
        );
        assert_eq!(
            render(&outcome),
            "Error: Property \"countr\" not found\nDid you mean one of these?\n  counter"
        );
    }

    #[test]
    fn test_render_self_referencing_host() {
        let outcome = Outcome::Value(Value::host(Loop));
        let text = render(&outcome);
        assert!(text.starts_with("Result:\n{"));
        assert_eq!(text.matches("\"next\"").count(), 3);
        assert!(text.contains("\"[host object]\""));

        let listed = Outcome::Value(Value::Array(vec![Value::host(Loop)]));
        assert_eq!(
            render(&listed),
            "Found 1 results:\n  [0] {\"next\":{\"next\":{\"next\":\"[host object]\"}}}"
        );
    }
}
