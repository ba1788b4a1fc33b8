//! Intent matcher - first-match dispatch of commands to intent handlers
//!
//! Intents are tried in registry order and each intent's patterns in their
//! declared order. The first pattern matching the whole command wins; nothing
//! after it is tried. `call` (with arguments) is registered before
//! `callNoArgs` so a trailing "with ..." clause is never swallowed into the
//! function name.

use regex::{Captures, Regex};

use crate::arguments::{coerce, ParsedArgument};
use crate::config::TalkConfig;
use crate::dom::{find_elements, Document};
use crate::error::TalkError;
use crate::invoker::invoke;
use crate::presentation::{PresentationSink, TracingSink};
use crate::resolver::resolve;
use crate::suggest::suggest_functions;
use crate::types::{ErrorKind, ErrorResult, Function, Map, Outcome, Value};

/// Verbs shared by the two call intents
const CALL_VERBS: [&str; 3] = ["call", "run", "execute"];

/// What a handler sees of the interpreter while running
pub struct Scope<'a> {
    pub context: &'a Value,
    pub config: &'a TalkConfig,
    pub document: Option<&'a dyn Document>,
}

type Handler = fn(&Captures<'_>, &Scope<'_>) -> Outcome;

/// A named command category with its ordered trigger patterns
pub struct IntentDefinition {
    pub name: &'static str,
    pub patterns: Vec<Regex>,
    handler: Handler,
}

impl IntentDefinition {
    fn new(name: &'static str, patterns: Vec<String>, handler: Handler) -> Self {
        // Patterns are fixed at compile time - these should never fail
        let patterns = patterns
            .iter()
            .map(|p| Regex::new(p).expect("Invalid intent pattern"))
            .collect();
        Self { name, patterns, handler }
    }
}

/// The fixed intent registry, in match priority order.
fn default_intents() -> Vec<IntentDefinition> {
    vec![
        IntentDefinition::new(
            "get",
            vec![
                r"(?i)^what(?:'s| is) (?:in |the |my |our )?(?P<path>.+?)\??$".to_string(),
                r"(?i)^show (?:me )?(?:the |my |our )?(?P<path>.+)$".to_string(),
                r"(?i)^display (?:the |my |our )?(?P<path>.+)$".to_string(),
                r"(?i)^log (?:the |my |our )?(?P<path>.+)$".to_string(),
            ],
            handle_get,
        ),
        IntentDefinition::new(
            "call",
            CALL_VERBS
                .iter()
                .map(|verb| {
                    format!(
                        r"(?i)^{} (?:the |my |our )?(?P<function>.+?) (?:with|using) (?P<args>.+)$",
                        verb
                    )
                })
                .collect(),
            handle_call,
        ),
        IntentDefinition::new(
            "callNoArgs",
            CALL_VERBS
                .iter()
                .map(|verb| format!(r"(?i)^{} (?:the |my |our )?(?P<function>.+?)$", verb))
                .collect(),
            handle_call_no_args,
        ),
        IntentDefinition::new(
            "find",
            vec![
                r"(?i)^find (?:all )?(?P<target>.+?) (?:with|that has|having) (?P<condition>.+)$"
                    .to_string(),
                r"(?i)^search (?:for )?(?P<target>.+?) (?:with|that has|having) (?P<condition>.+)$"
                    .to_string(),
            ],
            handle_find,
        ),
    ]
}

fn capture<'c>(captures: &'c Captures<'_>, name: &str) -> &'c str {
    captures.name(name).map_or("", |m| m.as_str()).trim()
}

fn handle_get(captures: &Captures<'_>, scope: &Scope<'_>) -> Outcome {
    resolve(capture(captures, "path"), scope.context, scope.config).into()
}

fn handle_call(captures: &Captures<'_>, scope: &Scope<'_>) -> Outcome {
    let function = match lookup_function(capture(captures, "function"), scope) {
        Ok(f) => f,
        Err(err) => return Outcome::Error(err),
    };
    let args = coerce(capture(captures, "args"))
        .into_iter()
        .map(ParsedArgument::into_value)
        .collect();
    invoke(&function, args).into()
}

fn handle_call_no_args(captures: &Captures<'_>, scope: &Scope<'_>) -> Outcome {
    match lookup_function(capture(captures, "function"), scope) {
        Ok(function) => invoke(&function, Vec::new()).into(),
        Err(err) => Outcome::Error(err),
    }
}

fn handle_find(captures: &Captures<'_>, scope: &Scope<'_>) -> Outcome {
    let target = capture(captures, "target");
    let condition = capture(captures, "condition");

    let target_lower = target.to_lowercase();
    if target_lower.contains("dom") || target_lower.contains("element") {
        find_elements(condition, scope.document).into()
    } else {
        find_in_context(target, condition)
    }
}

/// Structured search over the context is not supported yet.
fn find_in_context(target: &str, condition: &str) -> Outcome {
    tracing::debug!(target, condition, "context search requested");
    Outcome::Error(ErrorResult::new(
        ErrorKind::Unimplemented,
        "Advanced context searching not implemented yet",
    ))
}

fn lookup_function(name: &str, scope: &Scope<'_>) -> Result<Function, ErrorResult> {
    let found = resolve(name, scope.context, scope.config).ok();
    match found.as_ref().and_then(Value::as_function) {
        Some(function) => Ok(function.clone()),
        None => Err(ErrorResult::new(
            ErrorKind::FunctionNotFound,
            format!("Could not find function \"{}\"", name),
        )
        .with_suggestions(suggest_functions(name, scope.context, scope.config))
        .with_path(name)),
    }
}

/// Natural-language command interpreter over a host-supplied context
///
/// Each interpreter owns its own context. Hosts sharing one across threads
/// wrap it in their own lock.
pub struct Interpreter {
    context: Value,
    intents: Vec<IntentDefinition>,
    config: TalkConfig,
    sink: Box<dyn PresentationSink>,
    document: Option<Box<dyn Document>>,
}

impl Interpreter {
    /// An interpreter with an empty context that presents results through
    /// `tracing`.
    pub fn new() -> Self {
        Self {
            context: Value::Object(Map::default()),
            intents: default_intents(),
            config: TalkConfig::default(),
            sink: Box::new(TracingSink),
            document: None,
        }
    }

    pub fn with_config(mut self, config: TalkConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_sink<S: PresentationSink + 'static>(mut self, sink: S) -> Self {
        self.sink = Box::new(sink);
        self
    }

    pub fn with_document<D: Document + 'static>(mut self, document: D) -> Self {
        self.document = Some(Box::new(document));
        self
    }

    /// The current context root (always an object).
    pub fn context(&self) -> &Value {
        &self.context
    }

    pub fn config(&self) -> &TalkConfig {
        &self.config
    }

    /// Intent names in match priority order.
    pub fn intent_names(&self) -> Vec<&'static str> {
        self.intents.iter().map(|intent| intent.name).collect()
    }

    /// Replace the context. Returns the number of top-level keys.
    pub fn set_context(&mut self, context: Value) -> Result<usize, TalkError> {
        match context {
            Value::Object(map) => {
                let count = map.len();
                self.context = Value::Object(map);
                tracing::info!("Context set with {} items", count);
                Ok(count)
            }
            other => Err(self.reject(TalkError::NotAContainer { found: other.type_name() })),
        }
    }

    /// Shallow-merge `partial` into the context; its keys win. Returns the
    /// number of keys merged.
    pub fn add_to_context(&mut self, partial: Value) -> Result<usize, TalkError> {
        let additions = match partial {
            Value::Object(map) => map,
            other => return Err(self.reject(TalkError::NotAContainer { found: other.type_name() })),
        };

        let count = additions.len();
        match &mut self.context {
            Value::Object(context) => context.extend(additions),
            root => *root = Value::Object(additions),
        }
        tracing::info!("Added {} items to context", count);
        Ok(count)
    }

    /// [`Interpreter::set_context`] from a JSON document.
    pub fn set_context_json(&mut self, json: &str) -> Result<usize, TalkError> {
        let parsed = self.parse_json(json)?;
        self.set_context(parsed)
    }

    /// [`Interpreter::add_to_context`] from a JSON document.
    pub fn add_to_context_json(&mut self, json: &str) -> Result<usize, TalkError> {
        let parsed = self.parse_json(json)?;
        self.add_to_context(parsed)
    }

    fn parse_json(&self, json: &str) -> Result<Value, TalkError> {
        serde_json::from_str::<serde_json::Value>(json)
            .map(Value::from)
            .map_err(|e| self.reject(TalkError::from(e)))
    }

    fn reject(&self, error: TalkError) -> TalkError {
        self.sink.rejected(&error);
        error
    }

    /// Interpret one command.
    ///
    /// `Ok(None)` means no intent recognized the command. Failures inside a
    /// recognized command come back as `Outcome::Error`.
    pub fn process(&self, command: &str) -> Result<Option<Outcome>, TalkError> {
        let trimmed = command.trim();
        if trimmed.is_empty() {
            return Err(self.reject(TalkError::EmptyCommand));
        }

        let scope = Scope {
            context: &self.context,
            config: &self.config,
            document: self.document.as_deref(),
        };

        for intent in &self.intents {
            for (index, pattern) in intent.patterns.iter().enumerate() {
                if let Some(captures) = pattern.captures(trimmed) {
                    tracing::debug!(intent = intent.name, pattern = index, "command matched");
                    let outcome = (intent.handler)(&captures, &scope);
                    self.sink.present(command, intent.name, &outcome);
                    return Ok(Some(outcome));
                }
            }
        }

        tracing::debug!(command, "no intent matched");
        self.sink.unrecognized(command);
        Ok(None)
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}
