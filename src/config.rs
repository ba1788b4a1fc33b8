//! Interpreter tuning knobs

use serde::Deserialize;

use crate::error::TalkError;
use crate::resolver::DEFAULT_MAX_KEY_DEPTH;
use crate::similarity::DEFAULT_MAX_EDIT_DISTANCE;

/// Limits used when building suggestions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TalkConfig {
    /// Largest edit distance at which a key still counts as similar.
    pub max_edit_distance: usize,
    /// How many levels deep function suggestions look.
    pub max_key_depth: usize,
}

impl Default for TalkConfig {
    fn default() -> Self {
        Self {
            max_edit_distance: DEFAULT_MAX_EDIT_DISTANCE,
            max_key_depth: DEFAULT_MAX_KEY_DEPTH,
        }
    }
}

impl TalkConfig {
    /// Parse a config from JSON; missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, TalkError> {
        serde_json::from_str(json).map_err(|e| TalkError::Config(e.to_string()))
    }
}
