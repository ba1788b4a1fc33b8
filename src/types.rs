//! Core data types for interpreter results and the context graph

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

/// Insertion-ordered map backing the context and every nested object.
///
/// Key enumeration order is the order keys were inserted, which is the order
/// suggestions are reported in.
pub type Map = IndexMap<String, Value, ahash::RandomState>;

/// Error returned by a context function that fails.
pub type FunctionError = Box<dyn std::error::Error + Send + Sync>;

/// Anything that can be called with a positional argument list.
pub trait Invocable: Send + Sync {
    fn invoke(&self, args: &[Value]) -> Result<Value, FunctionError>;
}

impl<F> Invocable for F
where
    F: Fn(&[Value]) -> Result<Value, FunctionError> + Send + Sync,
{
    fn invoke(&self, args: &[Value]) -> Result<Value, FunctionError> {
        self(args)
    }
}

/// Shared handle to a callable context entry. Equality is identity.
#[derive(Clone)]
pub struct Function(Arc<dyn Invocable>);

impl Function {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, FunctionError> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn from_invocable<I: Invocable + 'static>(invocable: I) -> Self {
        Self(Arc::new(invocable))
    }

    pub fn call(&self, args: &[Value]) -> Result<Value, FunctionError> {
        self.0.invoke(args)
    }
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Function(..)")
    }
}

/// An object exposing readable fields whose reads may fail.
pub trait HostObject: Send + Sync {
    /// Field names in enumeration order.
    fn keys(&self) -> Vec<String>;

    /// Read a field. `Ok(None)` means the field is not defined.
    fn get(&self, key: &str) -> Result<Option<Value>, FunctionError>;
}

/// Shared handle to a [`HostObject`]. Equality is identity.
#[derive(Clone)]
pub struct HostRef(pub Arc<dyn HostObject>);

impl HostRef {
    pub fn new<H: HostObject + 'static>(host: H) -> Self {
        Self(Arc::new(host))
    }

    /// Field names, or none if enumerating them panics.
    pub fn field_names(&self) -> Vec<String> {
        crate::invoker::catch_fault(|| Ok(self.0.keys())).unwrap_or_else(|message| {
            tracing::debug!(%message, "host object keys failed");
            Vec::new()
        })
    }

    /// Read a field. A getter that errors or panics yields its message.
    pub fn read(&self, key: &str) -> Result<Option<Value>, String> {
        crate::invoker::catch_fault(|| self.0.get(key))
    }
}

impl PartialEq for HostRef {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for HostRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.field_names()).finish()
    }
}

/// A dynamically typed context value
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Array(Vec<Value>),
    Object(Map),
    Function(Function),
    Host(HostRef),
}

impl Value {
    /// Wrap a closure as a callable value.
    pub fn function<F>(f: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, FunctionError> + Send + Sync + 'static,
    {
        Value::Function(Function::new(f))
    }

    pub fn host<H: HostObject + 'static>(host: H) -> Self {
        Value::Host(HostRef::new(host))
    }

    /// Build an object from key/value pairs, keeping their order.
    pub fn object<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Value::Object(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, Value::Function(_))
    }

    /// Objects and host objects; arrays are not containers for key traversal.
    pub fn is_container(&self) -> bool {
        matches!(self, Value::Object(_) | Value::Host(_))
    }

    pub fn as_function(&self) -> Option<&Function> {
        match self {
            Value::Function(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Map> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Int(_) | Value::Float(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Function(_) => "function",
            Value::Host(_) => "host object",
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n.into())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        Value::Object(map)
    }
}

impl From<Function> for Value {
    fn from(f: Function) -> Self {
        Value::Function(f)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(fields) => Value::Object(
                fields
                    .into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect(),
            ),
        }
    }
}

/// Host objects nested deeper than this render as a placeholder, which keeps
/// self-referencing hosts finite.
pub const MAX_HOST_RENDER_DEPTH: usize = 3;

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        Bounded { value: self, hosts: 0 }.serialize(serializer)
    }
}

/// A value together with the number of host objects enclosing it.
struct Bounded<'a> {
    value: &'a Value,
    hosts: usize,
}

impl Bounded<'_> {
    fn child<'c>(&self, value: &'c Value) -> Bounded<'c> {
        Bounded {
            value,
            hosts: self.hosts,
        }
    }
}

impl Serialize for Bounded<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.value {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(n) => serializer.serialize_i64(*n),
            Value::Float(n) => serializer.serialize_f64(*n),
            Value::String(s) => serializer.serialize_str(s),
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(&self.child(item))?;
                }
                seq.end()
            }
            Value::Object(fields) => {
                let mut map = serializer.serialize_map(Some(fields.len()))?;
                for (k, v) in fields {
                    map.serialize_entry(k, &self.child(v))?;
                }
                map.end()
            }
            Value::Function(_) => serializer.serialize_str("[function]"),
            Value::Host(_) if self.hosts >= MAX_HOST_RENDER_DEPTH => {
                serializer.serialize_str("[host object]")
            }
            Value::Host(host) => {
                // Unreadable fields are left out.
                let mut map = serializer.serialize_map(None)?;
                for key in host.field_names() {
                    if let Ok(Some(v)) = host.read(&key) {
                        let nested = Bounded {
                            value: &v,
                            hosts: self.hosts + 1,
                        };
                        map.serialize_entry(&key, &nested)?;
                    }
                }
                map.end()
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(n) => write!(f, "{}", n),
            Value::String(s) => f.write_str(s),
            Value::Function(_) => f.write_str("[function]"),
            other => match serde_json::to_string(other) {
                Ok(json) => f.write_str(&json),
                Err(_) => f.write_str(other.type_name()),
            },
        }
    }
}

/// Classification of a failed command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    UnresolvedPath,
    MissingContainer,
    TraversalFault,
    FunctionNotFound,
    InvocationFault,
    Unimplemented,
    DomUnavailable,
    InvalidSelector,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::UnresolvedPath => "unresolved_path",
            ErrorKind::MissingContainer => "missing_container",
            ErrorKind::TraversalFault => "traversal_fault",
            ErrorKind::FunctionNotFound => "function_not_found",
            ErrorKind::InvocationFault => "invocation_fault",
            ErrorKind::Unimplemented => "unimplemented",
            ErrorKind::DomUnavailable => "dom_unavailable",
            ErrorKind::InvalidSelector => "invalid_selector",
        }
    }
}

/// A failed command, returned in-band as part of an [`Outcome`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorResult {
    pub kind: ErrorKind,
    #[serde(rename = "error")]
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub args: Option<Vec<Value>>,
}

impl ErrorResult {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            suggestions: Vec::new(),
            path: None,
            args: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_suggestions(mut self, suggestions: Vec<String>) -> Self {
        self.suggestions = suggestions;
        self
    }

    pub fn with_args(mut self, args: Vec<Value>) -> Self {
        self.args = Some(args);
        self
    }
}

impl fmt::Display for ErrorResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Result of a recognized command
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Outcome {
    Value(Value),
    Error(ErrorResult),
}

impl Outcome {
    pub fn is_error(&self) -> bool {
        matches!(self, Outcome::Error(_))
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            Outcome::Value(v) => Some(v),
            Outcome::Error(_) => None,
        }
    }

    pub fn error(&self) -> Option<&ErrorResult> {
        match self {
            Outcome::Error(e) => Some(e),
            Outcome::Value(_) => None,
        }
    }
}

impl From<Result<Value, ErrorResult>> for Outcome {
    fn from(result: Result<Value, ErrorResult>) -> Self {
        match result {
            Ok(v) => Outcome::Value(v),
            Err(e) => Outcome::Error(e),
        }
    }
}
