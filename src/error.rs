//! Usage errors raised at the interpreter's entry points

use thiserror::Error;

/// A malformed call into the interpreter.
///
/// Failures inside a recognized command are not reported here; they come back
/// in-band as [`crate::ErrorResult`].
#[derive(Debug, Error)]
pub enum TalkError {
    #[error("Please provide a valid command string")]
    EmptyCommand,

    #[error("Context must be an object, got {found}")]
    NotAContainer { found: &'static str },

    #[error("Invalid context JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),
}
