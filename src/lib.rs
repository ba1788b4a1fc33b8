//! Talk core - natural-language commands over a live object graph
//!
//! Classifies short imperative sentences ("what is user.name", "call sum with
//! 3, 4") by pattern, resolves them against a host-supplied context, and
//! offers suggestions when a name cannot be found.

pub mod types;
pub mod error;
pub mod config;
pub mod similarity;
pub mod resolver;
pub mod suggest;
pub mod arguments;
pub mod invoker;
pub mod dom;
pub mod presentation;
pub mod matcher;

pub use types::*;
pub use error::TalkError;
pub use config::TalkConfig;
pub use similarity::{is_similar, levenshtein_distance};
pub use resolver::{all_key_paths, resolve};
pub use suggest::{suggest_functions, suggest_properties};
pub use arguments::{coerce, coerce_token, ParsedArgument};
pub use invoker::invoke;
pub use dom::{find_elements, translate_selector, Document};
pub use presentation::{render, PresentationSink, TracingSink};
pub use matcher::{IntentDefinition, Interpreter, Scope};

// Python bindings
#[cfg(feature = "python")]
pub mod py;

#[cfg(feature = "python")]
use pyo3::prelude::*;

#[cfg(feature = "python")]
#[pymodule]
fn talk_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    use py::*;
    m.add_class::<PyInterpreter>()?;
    m.add_function(wrap_pyfunction!(py_levenshtein_distance, m)?)?;
    m.add_function(wrap_pyfunction!(py_coerce_arguments, m)?)?;
    Ok(())
}
