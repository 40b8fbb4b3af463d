//! Ordered test suites.
//!
//! A [`Suite`] owns its cases in registration order, which is also execution
//! and report order. Cases built through the suite inherit its default setup
//! and teardown; cases pushed directly keep whatever hooks they were built
//! with.
//!
//! ```
//! use swallow::{RunConfig, Suite, TestResult};
//!
//! #[derive(Debug, thiserror::Error)]
//! #[error("division by zero")]
//! struct DivideByZero;
//!
//! fn divide(a: i32, b: i32) -> Result<i32, DivideByZero> {
//!     a.checked_div(b).ok_or(DivideByZero)
//! }
//!
//! let mut suite = Suite::new();
//! suite.test("divides", || -> TestResult {
//!     divide(6, 3)?;
//!     Ok(())
//! })?;
//! suite.expect::<DivideByZero>("rejects zero", || -> TestResult {
//!     divide(1, 0)?;
//!     Ok(())
//! })?;
//!
//! let outcomes: Vec<_> = suite.outcomes().collect();
//! assert!(outcomes.iter().all(|(_, outcome)| outcome.is_passed()));
//! # Ok::<(), swallow::RegistrationError>(())
//! ```

use crate::callable::{self, Callable};
use crate::case::{TestCase, TestCaseBuilder};
use crate::config::RunConfig;
use crate::errors::{RegistrationError, Role};
use crate::fault::FaultKind;
use crate::outcome::{RunOutcome, SuiteReport};
use crate::report::Reporter;
use crate::timing;
use std::error::Error;
use std::io;
use std::rc::Rc;
use termcolor::{StandardStream, WriteColor};
use tracing::{debug, info};

/// Case name used when reporting invalid suite-level hooks.
const SUITE_HOOK_OWNER: &str = "<suite>";

#[derive(Debug, Default)]
pub struct Suite {
    cases: Vec<Rc<TestCase>>,
    default_setup: Option<Callable>,
    default_teardown: Option<Callable>,
}

impl Suite {
    /// An empty suite without default hooks.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> SuiteBuilder {
        SuiteBuilder::default()
    }

    // =========================================================================
    // REGISTRATION
    // =========================================================================

    /// Appends an already built case and hands back a shared handle to it.
    pub fn push(&mut self, case: impl Into<Rc<TestCase>>) -> Rc<TestCase> {
        let case = case.into();
        debug!(case = case.name(), position = self.cases.len(), "registered");
        self.cases.push(Rc::clone(&case));
        case
    }

    /// Starts a case preloaded with the suite's default hooks. Nothing is
    /// registered until the result is built and pushed.
    pub fn case(&self, name: impl Into<String>, body: impl Into<Callable>) -> TestCaseBuilder {
        TestCase::builder(name, body).hooks(self.default_setup.clone(), self.default_teardown.clone())
    }

    pub fn test(
        &mut self,
        name: impl Into<String>,
        body: impl Into<Callable>,
    ) -> Result<Rc<TestCase>, RegistrationError> {
        self.test_if(true, name, body)
    }

    /// Registers a case that only runs when `run_condition` is true. The
    /// condition is fixed here and never evaluated again.
    pub fn test_if(
        &mut self,
        run_condition: bool,
        name: impl Into<String>,
        body: impl Into<Callable>,
    ) -> Result<Rc<TestCase>, RegistrationError> {
        let case = self.case(name, body).run_if(run_condition).build()?;
        Ok(self.push(case))
    }

    /// Registers a case that passes only if its body fails with exactly `E`.
    pub fn expect<E: Error + 'static>(
        &mut self,
        name: impl Into<String>,
        body: impl Into<Callable>,
    ) -> Result<Rc<TestCase>, RegistrationError> {
        self.expect_kind(FaultKind::of::<E>(), true, name, body)
    }

    pub fn expect_if<E: Error + 'static>(
        &mut self,
        run_condition: bool,
        name: impl Into<String>,
        body: impl Into<Callable>,
    ) -> Result<Rc<TestCase>, RegistrationError> {
        self.expect_kind(FaultKind::of::<E>(), run_condition, name, body)
    }

    pub fn expect_kind(
        &mut self,
        kind: FaultKind,
        run_condition: bool,
        name: impl Into<String>,
        body: impl Into<Callable>,
    ) -> Result<Rc<TestCase>, RegistrationError> {
        let case = self
            .case(name, body)
            .expect_kind(kind)
            .run_if(run_condition)
            .build()?;
        Ok(self.push(case))
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    pub fn cases(&self) -> &[Rc<TestCase>] {
        &self.cases
    }

    // =========================================================================
    // EXECUTION
    // =========================================================================

    /// Runs every case with output hidden and yields the outcomes in order.
    /// Nothing is printed; cases run as the iterator is advanced.
    pub fn outcomes(&self) -> impl Iterator<Item = (&str, RunOutcome)> + '_ {
        self.cases.iter().map(|case| (case.name(), case.run(true)))
    }

    /// Runs the suite, reporting to the process's stdout and stderr.
    pub fn run(&self, config: &RunConfig) -> io::Result<SuiteReport> {
        let mut out = StandardStream::stdout(config.color_choice());
        let mut err = StandardStream::stderr(config.color_choice());
        self.run_with(config, &mut out, &mut err)
    }

    /// Runs the suite, reporting to the given streams.
    pub fn run_with(
        &self,
        config: &RunConfig,
        out: &mut dyn WriteColor,
        err: &mut dyn WriteColor,
    ) -> io::Result<SuiteReport> {
        let mut reporter = Reporter::new(out, err, config.expand_diagnostics);

        let (report, elapsed) = timing::timed(|| -> io::Result<SuiteReport> {
            let mut report = SuiteReport::default();
            for case in &self.cases {
                reporter.case_started(case.name())?;
                let outcome = case.run(config.capture_output);
                debug!(case = case.name(), status = %outcome.status(), "finished");
                reporter.case_finished(outcome.status())?;
                if let RunOutcome::Failed(failure) = &outcome {
                    reporter.failure(failure)?;
                }
                report.record(outcome.status());
            }
            reporter.summary(&report)?;
            Ok(report)
        });

        let mut report = report?;
        report.elapsed = elapsed;
        reporter.elapsed(elapsed)?;

        info!(
            total = report.total(),
            passed = report.passed,
            skipped = report.skipped,
            failed = report.failed,
            elapsed = report.elapsed_seconds(),
            "suite finished"
        );
        Ok(report)
    }
}

// =============================================================================
// BUILDER
// =============================================================================

/// Configures suite-level default hooks.
#[derive(Debug, Default)]
pub struct SuiteBuilder {
    setup: Option<Callable>,
    teardown: Option<Callable>,
}

impl SuiteBuilder {
    pub fn setup(mut self, setup: impl Into<Callable>) -> Self {
        self.setup = Some(setup.into());
        self
    }

    pub fn teardown(mut self, teardown: impl Into<Callable>) -> Self {
        self.teardown = Some(teardown.into());
        self
    }

    /// Validates the default hooks once, up front.
    pub fn build(self) -> Result<Suite, RegistrationError> {
        if let Some(setup) = &self.setup {
            callable::validate(Role::Setup, SUITE_HOOK_OWNER, setup)?;
        }
        if let Some(teardown) = &self.teardown {
            callable::validate(Role::Teardown, SUITE_HOOK_OWNER, teardown)?;
        }
        Ok(Suite {
            cases: Vec::new(),
            default_setup: self.setup,
            default_teardown: self.teardown,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callable::Signature;
    use crate::fault::TestResult;
    use std::cell::Cell;

    #[test]
    fn default_hooks_wrap_suite_built_cases_only() {
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let mut suite = Suite::builder()
            .setup(move || counter.set(counter.get() + 1))
            .build()
            .unwrap();

        suite.test("with default", || ()).unwrap();
        suite.push(TestCase::builder("bare", || ()).build().unwrap());

        let statuses: Vec<_> = suite.outcomes().map(|(_, o)| o.status()).collect();
        assert_eq!(statuses.len(), 2);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn invalid_default_hooks_are_rejected_once() {
        let err = Suite::builder()
            .teardown(Callable::parametric(Signature::required(1), |_: &[serde_json::Value]| ()))
            .build()
            .unwrap_err();
        assert_eq!(err.role(), Role::Teardown);
        assert!(err.to_string().contains(SUITE_HOOK_OWNER));
    }

    #[test]
    fn registration_returns_runnable_handles() {
        let mut suite = Suite::new();
        let case = suite
            .test("standalone", || -> TestResult { Ok(()) })
            .unwrap();
        assert_eq!(suite.len(), 1);
        assert!(Rc::ptr_eq(&case, &suite.cases()[0]));
        assert!(case.run(true).is_passed());
    }

    #[test]
    fn gated_registration_fixes_the_condition() {
        let mut suite = Suite::new();
        let case = suite.test_if(false, "gated", || ()).unwrap();
        assert!(!case.run_condition());
        assert!(case.run(true).is_skipped());
    }
}
