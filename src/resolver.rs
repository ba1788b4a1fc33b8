//! Dotted-path resolution against the context graph

use std::borrow::Cow;

use crate::config::TalkConfig;
use crate::suggest::suggest_properties;
use crate::types::{ErrorKind, ErrorResult, Value};

/// Default depth limit for key-path enumeration
pub const DEFAULT_MAX_KEY_DEPTH: usize = 3;

/// Resolve a dotted `path` such as `user.profile.name` starting at `root`.
///
/// Segments are trimmed before lookup. Every error carries the original
/// `path` string unchanged. The context is only read.
pub fn resolve(path: &str, root: &Value, config: &TalkConfig) -> Result<Value, ErrorResult> {
    let mut current: Cow<'_, Value> = Cow::Borrowed(root);

    for part in path.split('.') {
        let segment = part.trim();

        if current.is_null() {
            return Err(ErrorResult::new(
                ErrorKind::MissingContainer,
                format!("Cannot read property '{}' of null", segment),
            )
            .with_path(path));
        }

        current = match current {
            Cow::Borrowed(value) => step(value, segment, path, config)?,
            Cow::Owned(value) => Cow::Owned(step(&value, segment, path, config)?.into_owned()),
        };
    }

    Ok(current.into_owned())
}

fn step<'v>(
    value: &'v Value,
    segment: &str,
    path: &str,
    config: &TalkConfig,
) -> Result<Cow<'v, Value>, ErrorResult> {
    match member(value, segment) {
        Ok(Some(next)) => Ok(next),
        Ok(None) => {
            tracing::debug!(segment, path, "path segment not found");
            Err(ErrorResult::new(
                ErrorKind::UnresolvedPath,
                format!("Property \"{}\" not found", segment),
            )
            .with_suggestions(suggest_properties(segment, value, config.max_edit_distance))
            .with_path(path))
        }
        Err(fault) => Err(ErrorResult::new(ErrorKind::TraversalFault, fault).with_path(path)),
    }
}

/// Structural lookup of `key` on `value`.
///
/// `Ok(None)` when the key is not defined, `Err` when `value` cannot be
/// searched or a host getter fails.
pub(crate) fn member<'v>(value: &'v Value, key: &str) -> Result<Option<Cow<'v, Value>>, String> {
    match value {
        Value::Object(map) => Ok(map.get(key).map(Cow::Borrowed)),
        Value::Host(host) => host.read(key).map(|field| field.map(Cow::Owned)),
        Value::Array(items) => Ok(key
            .parse::<usize>()
            .ok()
            .and_then(|index| items.get(index))
            .map(Cow::Borrowed)),
        other => Err(format!(
            "Cannot look up property \"{}\" on a {} value",
            key,
            other.type_name()
        )),
    }
}

/// Immediate keys of `value` in enumeration order.
pub(crate) fn keys_of(value: &Value) -> Vec<String> {
    match value {
        Value::Object(map) => map.keys().cloned().collect(),
        Value::Host(host) => host.field_names(),
        Value::Array(items) => (0..items.len()).map(|i| i.to_string()).collect(),
        _ => Vec::new(),
    }
}

/// Every dotted key path reachable from `root` within `max_depth` levels.
///
/// Descends into objects and host objects only. The depth bound is the only
/// cycle guard. Keys are joined with `.` as-is, so a key that itself contains
/// a `.` is listed here but [`resolve`] splits it and cannot reach it.
pub fn all_key_paths(root: &Value, max_depth: usize) -> Vec<String> {
    let mut paths = Vec::new();
    collect_key_paths(root, "", 0, max_depth, &mut paths);
    paths
}

fn collect_key_paths(
    value: &Value,
    prefix: &str,
    depth: usize,
    max_depth: usize,
    out: &mut Vec<String>,
) {
    if depth >= max_depth || !value.is_container() {
        return;
    }

    for key in keys_of(value) {
        let full_key = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };
        out.push(full_key.clone());

        if let Ok(Some(child)) = member(value, &key) {
            if child.is_container() {
                collect_key_paths(&child, &full_key, depth + 1, max_depth, out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FunctionError, HostObject};

    fn context() -> Value {
        Value::object([
            ("counter", Value::Int(42)),
            (
                "user",
                Value::object([
                    ("name", Value::from("John")),
                    ("profile", Value::object([("age", Value::Int(30))])),
                    ("nickname", Value::Null),
                ]),
            ),
            ("tags", Value::Array(vec![Value::from("a"), Value::from("b")])),
            ("greet", Value::function(|_| Ok(Value::from("Hello!")))),
        ])
    }

    struct Account;

    impl HostObject for Account {
        fn keys(&self) -> Vec<String> {
            vec!["owner".to_string(), "balance".to_string()]
        }

        fn get(&self, key: &str) -> Result<Option<Value>, FunctionError> {
            match key {
                "owner" => Ok(Some(Value::from("ada"))),
                "balance" => Err("balance is locked".into()),
                _ => Ok(None),
            }
        }
    }

    struct Loop;

    impl HostObject for Loop {
        fn keys(&self) -> Vec<String> {
            vec!["next".to_string()]
        }

        fn get(&self, key: &str) -> Result<Option<Value>, FunctionError> {
            Ok((key == "next").then(|| Value::host(Loop)))
        }
    }

    struct Fragile;

    impl HostObject for Fragile {
        fn keys(&self) -> Vec<String> {
            panic!("keys exploded")
        }

        fn get(&self, key: &str) -> Result<Option<Value>, FunctionError> {
            match key {
                "boom" => panic!("getter exploded"),
                _ => Ok(None),
            }
        }
    }

    #[test]
    fn test_resolve_nested() {
        let ctx = context();
        let config = TalkConfig::default();
        assert_eq!(resolve("counter", &ctx, &config), Ok(Value::Int(42)));
        assert_eq!(resolve("user.name", &ctx, &config), Ok(Value::from("John")));
        assert_eq!(resolve("user . profile . age", &ctx, &config), Ok(Value::Int(30)));
        assert_eq!(resolve("tags.1", &ctx, &config), Ok(Value::from("b")));
    }

    #[test]
    fn test_resolve_keeps_function_identity() {
        let ctx = context();
        let original = ctx.as_object().expect("object")["greet"].clone();
        let resolved = resolve("greet", &ctx, &TalkConfig::default()).expect("resolves");
        assert_eq!(resolved, original);
    }

    #[test]
    fn test_missing_segment_reports_original_path() {
        let ctx = context();
        let path = "user. profle .age";
        let err = resolve(path, &ctx, &TalkConfig::default()).expect_err("missing");
        assert_eq!(err.kind, ErrorKind::UnresolvedPath);
        assert_eq!(err.message, "Property \"profle\" not found");
        assert_eq!(err.path.as_deref(), Some(path));
        // Suggestions come from the level where the lookup failed
        assert_eq!(err.suggestions, vec!["profile".to_string()]);
    }

    #[test]
    fn test_missing_container() {
        let ctx = context();
        let err = resolve("user.nickname.first", &ctx, &TalkConfig::default()).expect_err("null");
        assert_eq!(err.kind, ErrorKind::MissingContainer);
        assert!(err.message.contains("'first'"));
        assert_eq!(err.path.as_deref(), Some("user.nickname.first"));
    }

    #[test]
    fn test_lookup_on_primitive_is_fault() {
        let ctx = context();
        let err = resolve("counter.value", &ctx, &TalkConfig::default()).expect_err("primitive");
        assert_eq!(err.kind, ErrorKind::TraversalFault);
        assert_eq!(err.path.as_deref(), Some("counter.value"));
    }

    #[test]
    fn test_host_object_fields() {
        let ctx = Value::object([("account", Value::host(Account))]);
        let config = TalkConfig::default();
        assert_eq!(resolve("account.owner", &ctx, &config), Ok(Value::from("ada")));

        let err = resolve("account.balance", &ctx, &config).expect_err("getter fails");
        assert_eq!(err.kind, ErrorKind::TraversalFault);
        assert_eq!(err.message, "balance is locked");

        let err = resolve("account.ownr", &ctx, &config).expect_err("unknown field");
        assert_eq!(err.suggestions, vec!["owner".to_string()]);
    }

    #[test]
    fn test_all_key_paths() {
        let paths = all_key_paths(&context(), DEFAULT_MAX_KEY_DEPTH);
        assert_eq!(
            paths,
            vec![
                "counter",
                "user",
                "user.name",
                "user.profile",
                "user.profile.age",
                "user.nickname",
                "tags",
                "greet",
            ]
        );
    }

    #[test]
    fn test_all_key_paths_depth_bound() {
        let paths = all_key_paths(&context(), 1);
        assert_eq!(paths, vec!["counter", "user", "tags", "greet"]);
        assert!(all_key_paths(&Value::Int(1), 3).is_empty());
    }

    #[test]
    fn test_all_key_paths_terminates_on_cycle() {
        let ctx = Value::object([("loop", Value::host(Loop))]);
        let paths = all_key_paths(&ctx, 3);
        assert_eq!(paths, vec!["loop", "loop.next", "loop.next.next"]);
    }

    #[test]
    fn test_panicking_host_getter_is_fault() {
        let ctx = Value::object([("obj", Value::host(Fragile))]);
        let config = TalkConfig::default();
        let err = resolve("obj.boom", &ctx, &config).expect_err("getter panics");
        assert_eq!(err.kind, ErrorKind::TraversalFault);
        assert_eq!(err.message, "getter exploded");
        assert_eq!(err.path.as_deref(), Some("obj.boom"));

        // Suggesting for a missing field enumerates keys, which also panics
        let err = resolve("obj.other", &ctx, &config).expect_err("missing");
        assert_eq!(err.kind, ErrorKind::UnresolvedPath);
        assert!(err.suggestions.is_empty());
        assert_eq!(all_key_paths(&ctx, 3), vec!["obj"]);
    }
}
