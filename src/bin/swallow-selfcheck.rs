// Swallow checking itself: the engine's own behaviour expressed as a suite.
// Usage: cargo run --bin swallow-selfcheck -- [--nocapture] [--color never]

use std::process::ExitCode;
use swallow::{
    check, check_eq, cli, Callable, Invocable, RegistrationError, RunOutcome, Signature, Suite,
    TestCase, TestResult,
};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("attempt to divide by zero")]
struct DivideByZero;

#[derive(Debug, Error)]
#[error("mismatched types")]
struct TypeMismatch;

#[derive(Debug, Error)]
#[error("invalid literal for an integer: {0:?}")]
struct ValueError(String);

fn divide(a: i64, b: i64) -> Result<i64, DivideByZero> {
    a.checked_div(b).ok_or(DivideByZero)
}

fn parse_int(s: &str) -> Result<i64, ValueError> {
    s.parse().map_err(|_| ValueError(s.to_string()))
}

fn noop(_: &[serde_json::Value]) {}

// =============================================================================
// CASE PROTOCOL
// =============================================================================

fn single_case_protocol() -> TestResult {
    let a = TestCase::builder("a", || ()).build()?;
    check!(a.run(true).is_passed());

    let b = TestCase::builder("b", || -> TestResult {
        divide(1, 0)?;
        Ok(())
    })
    .expect::<DivideByZero>()
    .build()?;
    check!(b.run(true).is_passed());

    let c = TestCase::builder("c", || ())
        .setup(|| -> Result<(), ValueError> { parse_int("").map(drop) })
        .expect::<ValueError>()
        .build()?;
    check!(c.run(true).is_failed());

    let e = TestCase::builder("e", || -> TestResult {
        divide(1, 0)?;
        Ok(())
    })
    .build()?;
    let outcome = e.run(true);
    check!(outcome.is_failed());
    check!(outcome.fault().is_some_and(|f| f.is::<DivideByZero>()));

    let f = TestCase::builder("f", || ()).expect::<TypeMismatch>().build()?;
    let outcome = f.run(true);
    check_eq!(
        outcome.reason(),
        Some("No exception was raised (expected TypeMismatch).")
    );
    Ok(())
}

fn zero_argument_validator() -> TestResult {
    let cases = [
        (Callable::from(|| ()).zero_arg_invocable(), Invocable::Yes),
        (Callable::opaque(noop).zero_arg_invocable(), Invocable::Unknown),
        (Callable::parametric(Signature::required(1), noop).zero_arg_invocable(), Invocable::No),
        (
            Callable::parametric(Signature::nullary().with_optional(1), noop).zero_arg_invocable(),
            Invocable::Yes,
        ),
        (
            Callable::parametric(Signature::nullary().with_variadic(), noop).zero_arg_invocable(),
            Invocable::Yes,
        ),
        (
            Callable::parametric(Signature::required(2).with_optional(1).with_variadic(), noop)
                .zero_arg_invocable(),
            Invocable::No,
        ),
    ];
    for (actual, expected) in cases {
        check_eq!(actual, expected);
    }
    Ok(())
}

/// Writes to stdout; the line is hidden unless run with `--nocapture`.
fn hook_output() -> TestResult {
    print!("unterminated hook text, ");
    println!("hook line on stdout");
    Ok(())
}

// =============================================================================
// SUITE ACCOUNTING
// =============================================================================

fn suite_statuses() -> TestResult {
    let mut t = Suite::new();
    t.test_if(3 > 2, "a", || ())?;
    t.test_if(3 < 2, "b", || ())?;
    t.test("c", || ())?;
    t.expect::<DivideByZero>("d", || -> TestResult {
        divide(1, 0)?;
        Ok(())
    })?;
    t.test("e", || -> TestResult {
        divide(1, 0)?;
        Ok(())
    })?;
    t.expect::<TypeMismatch>("f", || -> TestResult {
        divide(1, 0)?;
        Ok(())
    })?;
    t.expect::<TypeMismatch>("g", || ())?;

    let statuses: Vec<Option<bool>> = t
        .outcomes()
        .map(|(_, outcome)| match outcome {
            RunOutcome::Passed => Some(true),
            RunOutcome::Skipped => None,
            RunOutcome::Failed(_) => Some(false),
        })
        .collect();
    let expected = [
        Some(true),
        None,
        Some(true),
        Some(true),
        Some(false),
        Some(false),
        Some(false),
    ];
    check_eq!(statuses, expected, statuses);
    Ok(())
}

// =============================================================================
// REGISTRATION ERRORS
// =============================================================================

fn inert_setup() -> Result<(), RegistrationError> {
    TestCase::builder("a", || ()).setup(Callable::inert(&42)).build()?;
    Ok(())
}

fn inert_teardown() -> Result<(), RegistrationError> {
    TestCase::builder("a", || ()).teardown(Callable::inert(&1337)).build()?;
    Ok(())
}

fn setup_with_argument() -> Result<(), RegistrationError> {
    TestCase::builder("a", || ())
        .setup(Callable::parametric(Signature::required(1), noop))
        .build()?;
    Ok(())
}

fn selfcheck_suite() -> Result<Suite, RegistrationError> {
    let mut suite = Suite::new();
    suite.test("single_case_protocol", single_case_protocol)?;
    suite.test("zero_argument_validator", zero_argument_validator)?;
    suite.test("hook_output", hook_output)?;
    suite.test("suite_statuses", suite_statuses)?;
    suite.expect::<RegistrationError>("inert_setup", inert_setup)?;
    suite.expect::<RegistrationError>("inert_teardown", inert_teardown)?;
    suite.expect::<RegistrationError>("setup_with_argument", setup_with_argument)?;
    Ok(suite)
}

fn main() -> ExitCode {
    match selfcheck_suite() {
        Ok(suite) => cli::run(&suite),
        Err(err) => {
            eprintln!("{:?}", miette::Report::new(err));
            ExitCode::FAILURE
        }
    }
}
