//! The unit of execution.
//!
//! A [`TestCase`] binds a body to optional setup/teardown hooks, an optional
//! expected fault kind and a run condition fixed at construction. [`run`]
//! implements the protocol:
//!
//! 1. run condition false: `Skipped`, nothing is invoked;
//! 2. setup faults: `Failed` with the setup fault, body and teardown skipped;
//! 3. body: an exact match on the expected kind counts as success, any other
//!    fault fails, and no fault fails when one was expected;
//! 4. teardown: its fault is recorded only if nothing failed before.
//!
//! [`run`]: TestCase::run

use crate::callable::{self, Callable};
use crate::capture::OutputCapture;
use crate::errors::{RegistrationError, Role};
use crate::fault::{FaultKind, TestResult};
use crate::outcome::{Failure, RunOutcome};
use crate::unwind;
use std::error::Error;
use tracing::debug;

/// A registered test: immutable once built.
#[derive(Debug, Clone)]
pub struct TestCase {
    name: String,
    body: Callable,
    setup: Option<Callable>,
    teardown: Option<Callable>,
    expected: Option<FaultKind>,
    run_condition: bool,
}

impl TestCase {
    pub fn builder(name: impl Into<String>, body: impl Into<Callable>) -> TestCaseBuilder {
        TestCaseBuilder {
            name: name.into(),
            body: body.into(),
            setup: None,
            teardown: None,
            expected: None,
            run_condition: true,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn expected(&self) -> Option<FaultKind> {
        self.expected
    }

    pub fn run_condition(&self) -> bool {
        self.run_condition
    }

    pub fn has_setup(&self) -> bool {
        self.setup.is_some()
    }

    pub fn has_teardown(&self) -> bool {
        self.teardown.is_some()
    }

    /// Calls the body directly, as plain code: no hooks, no capture, no
    /// panic interception.
    pub fn invoke(&self) -> TestResult {
        self.body.invoke()
    }

    /// Runs the case once. Faults never escape; they end up in the outcome.
    pub fn run(&self, capture_output: bool) -> RunOutcome {
        if !self.run_condition {
            debug!(case = %self.name, "not run: run condition is false");
            return RunOutcome::Skipped;
        }

        if let Some(setup) = &self.setup {
            if let Err(fault) = run_hook(setup, capture_output) {
                debug!(case = %self.name, %fault, "setup failed");
                return RunOutcome::Failed(Failure::Fault(fault));
            }
        }

        let mut failure = match (run_hook(&self.body, capture_output), self.expected) {
            (Err(fault), Some(kind)) if fault.kind() == kind => None,
            (Err(fault), _) => Some(Failure::Fault(fault)),
            (Ok(()), Some(kind)) => Some(Failure::Reason(format!(
                "No exception was raised (expected {}).",
                kind.name()
            ))),
            (Ok(()), None) => None,
        };

        if let Some(teardown) = &self.teardown {
            if let Err(fault) = run_hook(teardown, capture_output) {
                if failure.is_none() {
                    failure = Some(Failure::Fault(fault));
                } else {
                    debug!(case = %self.name, %fault, "teardown fault suppressed, an earlier failure wins");
                }
            }
        }

        match failure {
            Some(failure) => RunOutcome::Failed(failure),
            None => RunOutcome::Passed,
        }
    }
}

fn run_hook(hook: &Callable, capture_output: bool) -> TestResult {
    let _capture = OutputCapture::begin(capture_output);
    unwind::catch(|| hook.invoke())
}

// =============================================================================
// BUILDER
// =============================================================================

/// Builds a [`TestCase`], validating every hook in [`build`](Self::build).
#[derive(Debug, Clone)]
pub struct TestCaseBuilder {
    name: String,
    body: Callable,
    setup: Option<Callable>,
    teardown: Option<Callable>,
    expected: Option<FaultKind>,
    run_condition: bool,
}

impl TestCaseBuilder {
    pub fn setup(mut self, setup: impl Into<Callable>) -> Self {
        self.setup = Some(setup.into());
        self
    }

    pub fn teardown(mut self, teardown: impl Into<Callable>) -> Self {
        self.teardown = Some(teardown.into());
        self
    }

    /// Sets both hooks at once; `None` clears a hook.
    pub fn hooks(mut self, setup: Option<Callable>, teardown: Option<Callable>) -> Self {
        self.setup = setup;
        self.teardown = teardown;
        self
    }

    /// The body must fail with exactly `E` for the case to pass.
    pub fn expect<E: Error + 'static>(self) -> Self {
        self.expect_kind(FaultKind::of::<E>())
    }

    pub fn expect_kind(mut self, kind: FaultKind) -> Self {
        self.expected = Some(kind);
        self
    }

    pub fn run_if(mut self, run_condition: bool) -> Self {
        self.run_condition = run_condition;
        self
    }

    pub fn build(self) -> Result<TestCase, RegistrationError> {
        callable::validate(Role::Body, &self.name, &self.body)?;
        if let Some(setup) = &self.setup {
            callable::validate(Role::Setup, &self.name, setup)?;
        }
        if let Some(teardown) = &self.teardown {
            callable::validate(Role::Teardown, &self.name, teardown)?;
        }
        Ok(TestCase {
            name: self.name,
            body: self.body,
            setup: self.setup,
            teardown: self.teardown,
            expected: self.expected,
            run_condition: self.run_condition,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callable::Signature;
    use crate::fault::Panicked;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, thiserror::Error)]
    #[error("empty literal")]
    struct ValueError;

    #[test]
    fn skipped_cases_never_touch_hooks() {
        let case = TestCase::builder("gated", || -> TestResult { panic!("body ran") })
            .setup(|| -> TestResult { panic!("setup ran") })
            .teardown(|| -> TestResult { panic!("teardown ran") })
            .run_if(false)
            .build()
            .unwrap();
        assert!(case.run(true).is_skipped());
    }

    #[test]
    fn hooks_run_in_protocol_order() {
        let trace = Rc::new(RefCell::new(Vec::new()));
        let (s, b, t) = (trace.clone(), trace.clone(), trace.clone());
        let case = TestCase::builder("ordered", move || b.borrow_mut().push("body"))
            .setup(move || s.borrow_mut().push("setup"))
            .teardown(move || t.borrow_mut().push("teardown"))
            .build()
            .unwrap();
        assert!(case.run(false).is_passed());
        assert_eq!(*trace.borrow(), ["setup", "body", "teardown"]);
    }

    #[test]
    fn panicking_body_fails_with_panicked_kind() {
        let case = TestCase::builder("boom", || -> TestResult { panic!("kaboom") })
            .build()
            .unwrap();
        let outcome = case.run(true);
        assert!(outcome.fault().unwrap().is::<Panicked>());
    }

    #[test]
    fn panics_can_be_expected() {
        let case = TestCase::builder("boom", || -> TestResult { panic!("kaboom") })
            .expect::<Panicked>()
            .build()
            .unwrap();
        assert!(case.run(true).is_passed());
    }

    #[test]
    fn setup_with_required_arguments_is_rejected() {
        let err = TestCase::builder("c", || ())
            .setup(Callable::parametric(Signature::required(1), |_: &[serde_json::Value]| ()))
            .build()
            .unwrap_err();
        assert_eq!(err.role(), Role::Setup);
    }

    #[test]
    fn expected_kind_with_failing_setup_still_fails() {
        let case = TestCase::builder("d", || ())
            .setup(|| -> Result<(), ValueError> { Err(ValueError) })
            .expect::<ValueError>()
            .build()
            .unwrap();
        let outcome = case.run(true);
        assert!(outcome.fault().unwrap().is::<ValueError>());
    }

    #[test]
    fn builder_settings_are_visible_on_the_case() {
        let plain = TestCase::builder("plain", || ()).build().unwrap();
        assert_eq!(plain.name(), "plain");
        assert!(plain.expected().is_none());
        assert!(plain.run_condition());
        assert!(!plain.has_setup());
        assert!(!plain.has_teardown());

        let full = TestCase::builder("full", || ())
            .setup(|| ())
            .teardown(|| ())
            .expect::<ValueError>()
            .run_if(false)
            .build()
            .unwrap();
        assert_eq!(full.expected(), Some(FaultKind::of::<ValueError>()));
        assert!(!full.run_condition());
        assert!(full.has_setup());
        assert!(full.has_teardown());

        let cleared = TestCase::builder("cleared", || ())
            .setup(|| ())
            .hooks(None, Some(Callable::from(|| ())))
            .build()
            .unwrap();
        assert!(!cleared.has_setup());
        assert!(cleared.has_teardown());
    }

    #[test]
    fn typed_panics_can_be_expected_by_payload_type() {
        let case = TestCase::builder("typed", || -> TestResult {
            std::panic::panic_any(ValueError)
        })
        .expect::<ValueError>()
        .build()
        .unwrap();
        assert!(case.run(true).is_passed());
    }

    #[test]
    fn runs_are_repeatable() {
        let case = TestCase::builder("again", || ()).build().unwrap();
        for _ in 0..3 {
            assert!(case.run(true).is_passed());
        }
    }
}
