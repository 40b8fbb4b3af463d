//! Callables and the zero-argument validator.
//!
//! Hooks reach the engine in one of three shapes:
//!
//! - **Thunks**: ordinary Rust closures or functions taking no arguments.
//!   Their arity is known at compile time, so they always validate.
//! - **Parametric** callables: functions over a slice of JSON values, used
//!   when hooks come from data (scripts, plugin tables). They may declare a
//!   [`Signature`]; without one their arity is unknown and they are accepted.
//! - **Inert** values: something that was supplied where a callable was
//!   expected but cannot be invoked. These are rejected at registration.

use crate::errors::{RegistrationError, Role};
use crate::fault::{Fault, IntoTestResult, NotInvocable, TestResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::rc::Rc;

/// Answer of the zero-argument check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Invocable {
    /// Can be called with no arguments.
    Yes,
    /// Requires at least one positional argument.
    No,
    /// Arity cannot be determined; treated as acceptable.
    Unknown,
}

/// Declared parameters of a parametric callable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Signature {
    /// Positional parameters without a default.
    pub required: usize,
    /// Positional parameters with a default.
    #[serde(default)]
    pub optional: usize,
    /// Accepts any number of extra arguments.
    #[serde(default)]
    pub variadic: bool,
}

impl Signature {
    pub fn nullary() -> Self {
        Self::default()
    }

    pub fn required(required: usize) -> Self {
        Self {
            required,
            ..Self::default()
        }
    }

    pub fn with_optional(mut self, optional: usize) -> Self {
        self.optional = optional;
        self
    }

    pub fn with_variadic(mut self) -> Self {
        self.variadic = true;
        self
    }

    pub fn accepts_no_arguments(&self) -> bool {
        self.required == 0
    }
}

type ThunkFn = dyn Fn() -> TestResult;
type ParametricFn = dyn Fn(&[Value]) -> TestResult;

#[derive(Clone)]
enum Repr {
    Thunk(Rc<ThunkFn>),
    Parametric {
        signature: Option<Signature>,
        f: Rc<ParametricFn>,
    },
    Inert(String),
}

/// A setup, body or teardown candidate.
///
/// Cloning is cheap: the function itself is shared.
#[derive(Clone)]
pub struct Callable {
    repr: Repr,
}

impl Callable {
    pub fn thunk<F, R>(f: F) -> Self
    where
        F: Fn() -> R + 'static,
        R: IntoTestResult,
    {
        Self {
            repr: Repr::Thunk(Rc::new(move || f().into_test_result())),
        }
    }

    /// A data-driven callable with a declared signature.
    pub fn parametric<F, R>(signature: Signature, f: F) -> Self
    where
        F: Fn(&[Value]) -> R + 'static,
        R: IntoTestResult,
    {
        Self {
            repr: Repr::Parametric {
                signature: Some(signature),
                f: Rc::new(move |args: &[Value]| f(args).into_test_result()),
            },
        }
    }

    /// A data-driven callable whose signature cannot be inspected.
    pub fn opaque<F, R>(f: F) -> Self
    where
        F: Fn(&[Value]) -> R + 'static,
        R: IntoTestResult,
    {
        Self {
            repr: Repr::Parametric {
                signature: None,
                f: Rc::new(move |args: &[Value]| f(args).into_test_result()),
            },
        }
    }

    /// A value standing where a callable was expected.
    pub fn inert<T: fmt::Debug + ?Sized>(value: &T) -> Self {
        Self {
            repr: Repr::Inert(format!("{:?}", value)),
        }
    }

    pub fn is_callable(&self) -> bool {
        !matches!(self.repr, Repr::Inert(_))
    }

    /// Whether this can be invoked with no arguments at all.
    pub fn zero_arg_invocable(&self) -> Invocable {
        match &self.repr {
            Repr::Thunk(_) => Invocable::Yes,
            Repr::Parametric {
                signature: Some(sig),
                ..
            } if sig.accepts_no_arguments() => Invocable::Yes,
            Repr::Parametric {
                signature: Some(_), ..
            } => Invocable::No,
            Repr::Parametric {
                signature: None, ..
            } => Invocable::Unknown,
            Repr::Inert(_) => Invocable::No,
        }
    }

    /// Invokes the callable with no arguments. Panics are not caught here.
    pub fn invoke(&self) -> TestResult {
        match &self.repr {
            Repr::Thunk(f) => f(),
            Repr::Parametric { f, .. } => f(&[]),
            Repr::Inert(value) => Err(Fault::new(NotInvocable {
                value: value.clone(),
            })),
        }
    }

    pub fn describe(&self) -> String {
        match &self.repr {
            Repr::Thunk(_) => "<closure>".to_string(),
            Repr::Parametric {
                signature: Some(sig),
                ..
            } => format!(
                "<fn required={} optional={}{}>",
                sig.required,
                sig.optional,
                if sig.variadic { " variadic" } else { "" }
            ),
            Repr::Parametric { signature: None, .. } => "<fn ?>".to_string(),
            Repr::Inert(value) => value.clone(),
        }
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Callable({})", self.describe())
    }
}

impl<F, R> From<F> for Callable
where
    F: Fn() -> R + 'static,
    R: IntoTestResult,
{
    fn from(f: F) -> Self {
        Callable::thunk(f)
    }
}

/// Rejects callables that cannot serve as a zero-argument hook.
/// Only a definite `No` is an error; `Unknown` is accepted.
pub fn validate(role: Role, case: &str, callable: &Callable) -> Result<(), RegistrationError> {
    if !callable.is_callable() {
        return Err(RegistrationError::NotCallable {
            role,
            case: case.to_string(),
            value: callable.describe(),
        });
    }
    match &callable.repr {
        Repr::Parametric {
            signature: Some(sig),
            ..
        } if !sig.accepts_no_arguments() => Err(RegistrationError::RequiresArguments {
            role,
            case: case.to_string(),
            required: sig.required,
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_: &[Value]) {}

    #[test]
    fn closures_are_always_zero_arg() {
        let c = Callable::from(|| ());
        assert_eq!(c.zero_arg_invocable(), Invocable::Yes);
        assert!(validate(Role::Body, "a", &c).is_ok());
    }

    #[test]
    fn opaque_callables_are_unknown_but_accepted() {
        let c = Callable::opaque(noop);
        assert_eq!(c.zero_arg_invocable(), Invocable::Unknown);
        assert!(validate(Role::Setup, "a", &c).is_ok());
    }

    #[test]
    fn signatures_decide_invocability() {
        let cases = [
            (Signature::nullary(), Invocable::Yes),
            (Signature::required(1), Invocable::No),
            (Signature::nullary().with_optional(1), Invocable::Yes),
            (Signature::nullary().with_variadic(), Invocable::Yes),
            (Signature::nullary().with_optional(1).with_variadic(), Invocable::Yes),
            (Signature::required(2), Invocable::No),
            (Signature::required(2).with_optional(1).with_variadic(), Invocable::No),
        ];
        for (sig, expected) in cases {
            let c = Callable::parametric(sig, noop);
            assert_eq!(c.zero_arg_invocable(), expected, "{:?}", sig);
        }
    }

    #[test]
    fn arity_errors_report_required_count() {
        let c = Callable::parametric(Signature::required(2), noop);
        let err = validate(Role::Teardown, "k", &c).unwrap_err();
        assert_eq!(
            err,
            RegistrationError::RequiresArguments {
                role: Role::Teardown,
                case: "k".to_string(),
                required: 2,
            }
        );
    }

    #[test]
    fn inert_values_are_not_callable() {
        let c = Callable::inert(&42);
        assert!(!c.is_callable());
        let err = validate(Role::Setup, "a", &c).unwrap_err();
        assert!(matches!(err, RegistrationError::NotCallable { ref value, .. } if value == "42"));
        assert!(c.invoke().unwrap_err().is::<NotInvocable>());
    }

    #[test]
    fn parametric_callables_receive_no_arguments() {
        let c = Callable::parametric(Signature::nullary().with_optional(2), |args: &[Value]| {
            assert!(args.is_empty());
        });
        assert!(c.invoke().is_ok());
    }

    #[test]
    fn signatures_deserialize_with_defaults() {
        let sig: Signature = serde_json::from_str(r#"{"required": 1}"#).unwrap();
        assert_eq!(sig, Signature::required(1));
    }
}
