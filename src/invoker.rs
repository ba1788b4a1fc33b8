//! Function invocation with failure isolation

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use crate::types::{ErrorKind, ErrorResult, Function, FunctionError, Value};

/// Call `function` once with `args` as positional arguments.
///
/// A returned error or a panic inside the function becomes an
/// `InvocationFault` carrying the message and the arguments used. Side effects
/// the function performed before failing are kept.
pub fn invoke(function: &Function, args: Vec<Value>) -> Result<Value, ErrorResult> {
    match catch_fault(|| function.call(&args)) {
        Ok(value) => Ok(value),
        Err(message) => {
            tracing::debug!(%message, argc = args.len(), "function call failed");
            Err(ErrorResult::new(ErrorKind::InvocationFault, message).with_args(args))
        }
    }
}

/// Run host-supplied code, turning a returned error or a panic into its
/// message.
pub(crate) fn catch_fault<T>(
    call: impl FnOnce() -> Result<T, FunctionError>,
) -> Result<T, String> {
    match panic::catch_unwind(AssertUnwindSafe(call)) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(err.to_string()),
        Err(payload) => Err(panic_message(payload.as_ref())),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "function panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_invoke_passes_positional_args() {
        let sub = Function::new(|args| {
            let a = args.first().and_then(Value::as_i64).ok_or("missing a")?;
            let b = args.get(1).and_then(Value::as_i64).ok_or("missing b")?;
            Ok(Value::Int(a - b))
        });
        assert_eq!(invoke(&sub, vec![Value::Int(10), Value::Int(4)]), Ok(Value::Int(6)));
    }

    #[test]
    fn test_returned_error_is_isolated() {
        let failing = Function::new(|_| Err("database offline".into()));
        let err = invoke(&failing, vec![Value::from("x")]).expect_err("fails");
        assert_eq!(err.kind, ErrorKind::InvocationFault);
        assert_eq!(err.message, "database offline");
        assert_eq!(err.args, Some(vec![Value::from("x")]));
    }

    #[test]
    fn test_panic_is_isolated() {
        let panicking = Function::new(|_| panic!("kaboom"));
        let err = invoke(&panicking, Vec::new()).expect_err("panics");
        assert_eq!(err.message, "kaboom");
        assert_eq!(err.args, Some(Vec::new()));
    }

    #[test]
    fn test_called_exactly_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let flaky = Function::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Err("nope".into())
        });
        assert!(invoke(&flaky, Vec::new()).is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_catch_fault_formats_panic_payloads() {
        assert_eq!(catch_fault(|| Ok(7)), Ok(7));
        assert_eq!(catch_fault::<()>(|| Err("refused".into())), Err("refused".to_string()));
        let owned = catch_fault::<()>(|| panic!("{} exploded", "getter"));
        assert_eq!(owned, Err("getter exploded".to_string()));
    }
}
