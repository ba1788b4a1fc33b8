//! Suggestion engine for failed lookups

use crate::config::TalkConfig;
use crate::resolver::{all_key_paths, keys_of, resolve};
use crate::similarity::is_similar;
use crate::types::Value;

/// Immediate keys of `container` similar to `query`, in enumeration order.
pub fn suggest_properties(query: &str, container: &Value, max_distance: usize) -> Vec<String> {
    keys_of(container)
        .into_iter()
        .filter(|key| is_similar(key, query, max_distance))
        .collect()
}

/// Dotted paths under `root` that hold a function whose last segment is
/// similar to `query`.
pub fn suggest_functions(query: &str, root: &Value, config: &TalkConfig) -> Vec<String> {
    all_key_paths(root, config.max_key_depth)
        .into_iter()
        .filter(|path| {
            let last = path.rsplit('.').next().unwrap_or(path);
            is_similar(last, query, config.max_edit_distance)
        })
        .filter(|path| resolve(path, root, config).is_ok_and(|value| value.is_callable()))
        .collect()
}
