//! Python bindings for the interpreter using PyO3
//!
//! Python dicts become context objects and Python callables become context
//! functions, so a Python host can expose its live objects directly.

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::{PyBool, PyDict, PyFloat, PyList, PyLong, PyString, PyTuple};

use crate::arguments::coerce;
use crate::matcher::Interpreter;
use crate::similarity::levenshtein_distance;
use crate::types::{Function, FunctionError, Invocable, Map, Outcome, Value};

/// Levenshtein distance between two strings (Python function)
#[pyfunction]
pub fn py_levenshtein_distance(a: &str, b: &str) -> usize {
    levenshtein_distance(a, b)
}

/// Coerce a comma-separated argument string into Python values
#[pyfunction]
pub fn py_coerce_arguments(py: Python<'_>, args_text: &str) -> PyResult<Vec<PyObject>> {
    coerce(args_text)
        .into_iter()
        .map(|arg| value_to_py(py, &arg.into_value()))
        .collect()
}

/// A Python callable stored in the context
struct PyCallable(Py<PyAny>);

impl Invocable for PyCallable {
    fn invoke(&self, args: &[Value]) -> Result<Value, FunctionError> {
        Python::with_gil(|py| {
            let py_args = args
                .iter()
                .map(|arg| value_to_py(py, arg))
                .collect::<PyResult<Vec<_>>>()?;
            let result = self.0.bind(py).call1(PyTuple::new_bound(py, py_args))?;
            value_from_py(&result)
        })
        .map_err(|e| FunctionError::from(e.to_string()))
    }
}

/// Containers nested deeper than this convert to their `str()` text, which
/// stops self-referencing dicts and lists.
const MAX_CONVERSION_DEPTH: usize = 32;

fn value_from_py(obj: &Bound<'_, PyAny>) -> PyResult<Value> {
    value_from_py_at(obj, 0)
}

fn value_from_py_at(obj: &Bound<'_, PyAny>, depth: usize) -> PyResult<Value> {
    let nested = |item: &Bound<'_, PyAny>| value_from_py_at(item, depth + 1);
    // bool before int: Python bools are ints
    if obj.is_none() {
        Ok(Value::Null)
    } else if let Ok(b) = obj.downcast::<PyBool>() {
        Ok(Value::Bool(b.is_true()))
    } else if obj.is_instance_of::<PyLong>() {
        match obj.extract::<i64>() {
            Ok(n) => Ok(Value::Int(n)),
            Err(_) => Ok(Value::Float(obj.extract::<f64>()?)),
        }
    } else if obj.is_instance_of::<PyFloat>() {
        Ok(Value::Float(obj.extract::<f64>()?))
    } else if let Ok(s) = obj.downcast::<PyString>() {
        Ok(Value::String(s.to_str()?.to_owned()))
    } else if depth >= MAX_CONVERSION_DEPTH && !obj.is_callable() {
        Ok(Value::String(obj.str()?.to_string()))
    } else if let Ok(dict) = obj.downcast::<PyDict>() {
        let mut map = Map::default();
        for (key, value) in dict.iter() {
            map.insert(key.str()?.to_string(), nested(&value)?);
        }
        Ok(Value::Object(map))
    } else if let Ok(list) = obj.downcast::<PyList>() {
        let items = list
            .iter()
            .map(|item| nested(&item))
            .collect::<PyResult<Vec<_>>>()?;
        Ok(Value::Array(items))
    } else if let Ok(tuple) = obj.downcast::<PyTuple>() {
        let items = tuple
            .iter()
            .map(|item| nested(&item))
            .collect::<PyResult<Vec<_>>>()?;
        Ok(Value::Array(items))
    } else if obj.is_callable() {
        Ok(Value::Function(Function::from_invocable(PyCallable(
            obj.clone().unbind(),
        ))))
    } else {
        Ok(Value::String(obj.str()?.to_string()))
    }
}

fn value_to_py(py: Python<'_>, value: &Value) -> PyResult<PyObject> {
    let object = match value {
        Value::Null => py.None(),
        Value::Bool(b) => (*b).into_py(py),
        Value::Int(n) => (*n).into_py(py),
        Value::Float(n) => (*n).into_py(py),
        Value::String(s) => s.as_str().into_py(py),
        Value::Array(items) => {
            let list = PyList::empty_bound(py);
            for item in items {
                list.append(value_to_py(py, item)?)?;
            }
            list.into_py(py)
        }
        Value::Object(fields) => {
            let dict = PyDict::new_bound(py);
            for (key, field) in fields {
                dict.set_item(key, value_to_py(py, field)?)?;
            }
            dict.into_py(py)
        }
        Value::Function(_) | Value::Host(_) => value.to_string().into_py(py),
    };
    Ok(object)
}

fn outcome_to_py(py: Python<'_>, outcome: &Outcome) -> PyResult<PyObject> {
    let err = match outcome {
        Outcome::Value(value) => return value_to_py(py, value),
        Outcome::Error(err) => err,
    };

    let dict = PyDict::new_bound(py);
    dict.set_item("error", &err.message)?;
    dict.set_item("kind", err.kind.as_str())?;
    dict.set_item("suggestions", &err.suggestions)?;
    if let Some(path) = &err.path {
        dict.set_item("path", path)?;
    }
    if let Some(args) = &err.args {
        let list = PyList::empty_bound(py);
        for arg in args {
            list.append(value_to_py(py, arg)?)?;
        }
        dict.set_item("args", list)?;
    }
    Ok(dict.into_py(py))
}

/// Python wrapper for the interpreter
#[pyclass]
pub struct PyInterpreter {
    inner: Interpreter,
}

#[pymethods]
impl PyInterpreter {
    #[new]
    fn new() -> Self {
        Self {
            inner: Interpreter::new(),
        }
    }

    /// Replace the context with a dict. Returns False if it is not a dict.
    fn set_context(&mut self, context: &Bound<'_, PyAny>) -> PyResult<bool> {
        let value = value_from_py(context)?;
        Ok(self.inner.set_context(value).is_ok())
    }

    /// Merge a dict into the context. Returns False if it is not a dict.
    fn add_to_context(&mut self, additions: &Bound<'_, PyAny>) -> PyResult<bool> {
        let value = value_from_py(additions)?;
        Ok(self.inner.add_to_context(value).is_ok())
    }

    /// Interpret a command; None when no intent recognizes it.
    fn process(&self, py: Python<'_>, command: &str) -> PyResult<PyObject> {
        match self.inner.process(command) {
            Ok(Some(outcome)) => outcome_to_py(py, &outcome),
            Ok(None) => Ok(py.None()),
            Err(e) => Err(PyValueError::new_err(e.to_string())),
        }
    }

    /// Intent names in match priority order
    fn intent_names(&self) -> Vec<&'static str> {
        self.inner.intent_names()
    }
}
