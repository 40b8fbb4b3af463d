//! Swallow: a small test-execution engine.
//!
//! Register closures into a [`Suite`], optionally with setup/teardown hooks,
//! an expected fault kind or a run condition, then [`Suite::run`] them. Each
//! case prints one `PASS` / `NOT RUN` / `FAIL` line; failures come with the
//! fault, where it was raised and, for [`check!`] assertions, the failing
//! line with the captured values substituted in.

pub mod callable;
pub mod capture;
pub mod case;
pub mod check;
pub mod cli;
pub mod config;
pub mod errors;
pub mod expand;
pub mod fault;
pub mod outcome;
pub mod report;
pub mod suite;
pub mod timing;
mod unwind;

pub use callable::{Callable, Invocable, Signature};
pub use capture::OutputCapture;
pub use case::{TestCase, TestCaseBuilder};
pub use config::RunConfig;
pub use errors::{ConfigError, RegistrationError, Role};
pub use expand::{expand, Expansion};
pub use fault::{
    AssertionFailed, Binding, Fault, FaultKind, IntoTestResult, Location, NotInvocable, Panicked,
    TestResult,
};
pub use outcome::{Failure, RunOutcome, Status, SuiteReport};
pub use suite::{Suite, SuiteBuilder};
