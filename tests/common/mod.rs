//! # Shared fixtures for the Swallow integration tests
//!
//! Fault types used across test files and a helper that runs a suite into
//! plain-text buffers.

#![allow(dead_code)]

use swallow::{RunConfig, Suite, SuiteReport, TestResult};
use termcolor::Buffer;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("attempt to divide by zero")]
pub struct DivideByZero;

#[derive(Debug, Error)]
#[error("mismatched types")]
pub struct TypeMismatch;

pub fn divide(a: i64, b: i64) -> Result<i64, DivideByZero> {
    a.checked_div(b).ok_or(DivideByZero)
}

/// A body that divides by zero through `?`.
pub fn divides_by_zero() -> TestResult {
    divide(1, 0)?;
    Ok(())
}

/// Output of one suite run: report, stdout text, stderr text.
pub struct Rendered {
    pub report: SuiteReport,
    pub out: String,
    pub err: String,
}

pub fn render(suite: &Suite, config: &RunConfig) -> Rendered {
    let mut out = Buffer::no_color();
    let mut err = Buffer::no_color();
    let report = suite.run_with(config, &mut out, &mut err).unwrap();
    Rendered {
        report,
        out: String::from_utf8(out.into_inner()).unwrap(),
        err: String::from_utf8(err.into_inner()).unwrap(),
    }
}
