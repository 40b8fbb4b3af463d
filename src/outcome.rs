//! Per-case outcomes and the aggregate suite report.

use crate::fault::Fault;
use std::time::Duration;

/// Coarse classification of a [`RunOutcome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Passed,
    Failed,
    Skipped,
}

impl Status {
    /// The word printed after `Testing <name>: `.
    pub fn label(&self) -> &'static str {
        match self {
            Status::Passed => "PASS",
            Status::Failed => "FAIL",
            Status::Skipped => "NOT RUN",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Why a case failed: either a plain reason (an expected fault never
/// happened) or the fault that was raised.
#[derive(Debug)]
pub enum Failure {
    Reason(String),
    Fault(Fault),
}

/// Result of one `TestCase::run`.
#[derive(Debug)]
pub enum RunOutcome {
    Passed,
    Skipped,
    Failed(Failure),
}

impl RunOutcome {
    pub fn status(&self) -> Status {
        match self {
            RunOutcome::Passed => Status::Passed,
            RunOutcome::Skipped => Status::Skipped,
            RunOutcome::Failed(_) => Status::Failed,
        }
    }

    pub fn is_passed(&self) -> bool {
        matches!(self, RunOutcome::Passed)
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, RunOutcome::Skipped)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, RunOutcome::Failed(_))
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            RunOutcome::Failed(Failure::Reason(reason)) => Some(reason),
            _ => None,
        }
    }

    pub fn fault(&self) -> Option<&Fault> {
        match self {
            RunOutcome::Failed(Failure::Fault(fault)) => Some(fault),
            _ => None,
        }
    }
}

/// Aggregate counts of a suite run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuiteReport {
    pub passed: usize,
    pub skipped: usize,
    pub failed: usize,
    pub elapsed: Duration,
}

impl SuiteReport {
    pub fn record(&mut self, status: Status) {
        match status {
            Status::Passed => self.passed += 1,
            Status::Skipped => self.skipped += 1,
            Status::Failed => self.failed += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.passed + self.skipped + self.failed
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }

    /// Percentage of cases that ran and passed, ignoring skipped ones.
    pub fn success_rate(&self) -> f64 {
        let ran = self.passed + self.failed;
        if ran == 0 {
            return 0.0;
        }
        (self.passed as f64 / ran as f64) * 100.0
    }

    /// Same counts, ignoring elapsed time.
    pub fn same_counts(&self, other: &SuiteReport) -> bool {
        (self.passed, self.skipped, self.failed) == (other.passed, other.skipped, other.failed)
    }
}
