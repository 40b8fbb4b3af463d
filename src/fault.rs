//! Captured faults.
//!
//! A [`Fault`] is what the engine keeps when a setup, body or teardown fails:
//! the exact kind of the error, its message, where it was raised, a backtrace
//! and any values captured at an assertion site. Any `std::error::Error`
//! converts into a `Fault` through `?`, and the `?` site becomes the raise
//! location. Panics are converted into faults of kind [`Panicked`]; a panic
//! raised with `std::panic::panic_any(value)` takes the type of `value` as
//! its kind instead, so it can be expected like a returned error.
//!
//! `Fault` intentionally does not implement `std::error::Error`; that is what
//! keeps the blanket `From<E: Error>` conversion coherent.

use std::any::{type_name, TypeId};
use std::backtrace::{Backtrace, BacktraceStatus};
use std::error::Error;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::panic::Location as CallerLocation;
use thiserror::Error;

/// The result type of every hook run by the engine.
pub type TestResult = Result<(), Fault>;

// =============================================================================
// FAULT KINDS
// =============================================================================

/// The identity of an error type. Two kinds are equal only when they name the
/// very same concrete type; there is no notion of a parent kind.
#[derive(Clone, Copy)]
pub struct FaultKind {
    id: TypeId,
    name: &'static str,
}

impl FaultKind {
    pub fn of<E: 'static>() -> Self {
        Self {
            id: TypeId::of::<E>(),
            name: type_name::<E>(),
        }
    }

    /// Short, unqualified type name (`DivideByZero` rather than
    /// `my_crate::math::DivideByZero`).
    pub fn name(&self) -> &'static str {
        short_type_name(self.name)
    }

    pub fn full_name(&self) -> &'static str {
        self.name
    }

    pub fn is<E: 'static>(&self) -> bool {
        self.id == TypeId::of::<E>()
    }

    /// Kind of a typed panic payload; only the type identity is known.
    pub(crate) fn of_payload(id: TypeId) -> Self {
        Self {
            id,
            name: "panic payload",
        }
    }
}

impl PartialEq for FaultKind {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for FaultKind {}

impl Hash for FaultKind {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Strips the module path from a type name, keeping generic arguments intact.
fn short_type_name(full: &'static str) -> &'static str {
    let head = full.find('<').map_or(full, |i| &full[..i]);
    match head.rfind("::") {
        Some(i) => &full[i + 2..],
        None => full,
    }
}

// =============================================================================
// BUILT-IN FAULT TYPES
// =============================================================================

/// A hook panicked instead of returning an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("panicked: {message}")]
pub struct Panicked {
    pub message: String,
}

/// A `check!` or `check_eq!` assertion did not hold.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct AssertionFailed {
    pub message: String,
}

/// A value that is not invocable reached the engine as a hook.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{value} isn't callable")]
pub struct NotInvocable {
    pub value: String,
}

// =============================================================================
// LOCATIONS AND BINDINGS
// =============================================================================

/// A source position: the innermost point where a fault was raised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

impl From<&CallerLocation<'_>> for Location {
    fn from(loc: &CallerLocation<'_>) -> Self {
        Self {
            file: loc.file().to_string(),
            line: loc.line(),
            column: loc.column(),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// A named value recorded where an assertion failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub name: String,
    pub value: String,
}

impl Binding {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Records `value` using its `Debug` representation.
    pub fn capture<T: fmt::Debug + ?Sized>(name: &str, value: &T) -> Self {
        Self::new(name, format!("{:?}", value))
    }
}

// =============================================================================
// FAULT
// =============================================================================

/// The captured error of a failed hook.
pub struct Fault {
    kind: FaultKind,
    error: Box<dyn Error + 'static>,
    location: Option<Location>,
    backtrace: Backtrace,
    bindings: Vec<Binding>,
}

impl<E> From<E> for Fault
where
    E: Error + 'static,
{
    #[track_caller]
    fn from(error: E) -> Self {
        Fault::new(error)
    }
}

impl Fault {
    /// Captures `error`, recording the caller as the raise location.
    #[track_caller]
    pub fn new<E: Error + 'static>(error: E) -> Self {
        Self::unlocated(error).at(CallerLocation::caller().into())
    }

    /// Captures `error` without a known raise location.
    pub fn unlocated<E: Error + 'static>(error: E) -> Self {
        Self {
            kind: FaultKind::of::<E>(),
            error: Box::new(error),
            location: None,
            backtrace: Backtrace::capture(),
            bindings: Vec::new(),
        }
    }

    /// An assertion failure raised at the caller, carrying captured values.
    #[track_caller]
    pub fn assertion(message: impl Into<String>, bindings: Vec<Binding>) -> Self {
        Self::new(AssertionFailed {
            message: message.into(),
        })
        .with_bindings(bindings)
    }

    pub(crate) fn from_panic(
        message: String,
        location: Option<Location>,
        backtrace: Backtrace,
    ) -> Self {
        Self {
            kind: FaultKind::of::<Panicked>(),
            error: Box::new(Panicked { message }),
            location,
            backtrace,
            bindings: Vec::new(),
        }
    }

    pub(crate) fn with_kind(mut self, kind: FaultKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn at(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_bindings(mut self, bindings: Vec<Binding>) -> Self {
        self.bindings = bindings;
        self
    }

    pub fn kind(&self) -> FaultKind {
        self.kind
    }

    /// True when the kind is exactly `E`.
    pub fn is<E: Error + 'static>(&self) -> bool {
        self.kind.is::<E>()
    }

    pub fn downcast_ref<E: Error + 'static>(&self) -> Option<&E> {
        self.error.downcast_ref::<E>()
    }

    pub fn error(&self) -> &(dyn Error + 'static) {
        self.error.as_ref()
    }

    pub fn message(&self) -> String {
        self.error.to_string()
    }

    pub fn location(&self) -> Option<&Location> {
        self.location.as_ref()
    }

    /// The backtrace, when one was captured (see `RUST_BACKTRACE`).
    pub fn backtrace(&self) -> Option<&Backtrace> {
        match self.backtrace.status() {
            BacktraceStatus::Captured => Some(&self.backtrace),
            _ => None,
        }
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    /// Iterates over the error and its `source()` chain.
    pub fn chain(&self) -> impl Iterator<Item = &(dyn Error + 'static)> {
        std::iter::successors(Some(self.error()), |e: &&(dyn Error + 'static)| {
            (*e).source()
        })
    }
}

impl fmt::Debug for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fault")
            .field("kind", &self.kind)
            .field("message", &self.message())
            .field("location", &self.location)
            .field("bindings", &self.bindings)
            .finish()
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.error)
    }
}

// =============================================================================
// HOOK RETURN VALUES
// =============================================================================

/// Return types a hook may have: `()`, `Result<(), Fault>` or `Result<(), E>`
/// for any error type `E`.
pub trait IntoTestResult {
    fn into_test_result(self) -> TestResult;
}

impl IntoTestResult for () {
    fn into_test_result(self) -> TestResult {
        Ok(())
    }
}

impl IntoTestResult for TestResult {
    fn into_test_result(self) -> TestResult {
        self
    }
}

impl<E: Error + 'static> IntoTestResult for Result<(), E> {
    fn into_test_result(self) -> TestResult {
        self.map_err(Fault::unlocated)
    }
}
