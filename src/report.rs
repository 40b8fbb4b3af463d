//! Console rendering of a suite run.
//!
//! Per-case lines and the summary go to the output stream; failure
//! diagnostics go to the error stream. Colors are applied through
//! `termcolor`, so a `Buffer::no_color()` sink yields plain text.

use crate::expand::{self, Expansion};
use crate::fault::Fault;
use crate::outcome::{Failure, Status, SuiteReport};
use std::io;
use std::time::Duration;
use termcolor::{Color, ColorSpec, WriteColor};

pub struct Reporter<'a> {
    out: &'a mut dyn WriteColor,
    err: &'a mut dyn WriteColor,
    expand_diagnostics: bool,
}

impl<'a> Reporter<'a> {
    pub fn new(
        out: &'a mut dyn WriteColor,
        err: &'a mut dyn WriteColor,
        expand_diagnostics: bool,
    ) -> Self {
        Self {
            out,
            err,
            expand_diagnostics,
        }
    }

    /// Writes `Testing <name>: ` and flushes, so the prefix is visible before
    /// the case hides stdout.
    pub fn case_started(&mut self, name: &str) -> io::Result<()> {
        write!(self.out, "Testing {}: ", name)?;
        self.out.flush()
    }

    pub fn case_finished(&mut self, status: Status) -> io::Result<()> {
        self.out.set_color(&status_color(status))?;
        write!(self.out, "{}", status.label())?;
        self.out.reset()?;
        writeln!(self.out)?;
        self.out.flush()
    }

    pub fn failure(&mut self, failure: &Failure) -> io::Result<()> {
        match failure {
            Failure::Reason(reason) => writeln!(self.err, "{}", reason)?,
            Failure::Fault(fault) => self.fault(fault)?,
        }
        self.err.flush()
    }

    /// `<N> tests, <P> PASS, <S> NOT RUN, <F> FAIL`, preceded by a blank line.
    pub fn summary(&mut self, report: &SuiteReport) -> io::Result<()> {
        writeln!(self.out)?;
        writeln!(
            self.out,
            "{} tests, {} {}, {} {}, {} {}",
            report.total(),
            report.passed,
            Status::Passed.label(),
            report.skipped,
            Status::Skipped.label(),
            report.failed,
            Status::Failed.label(),
        )
    }

    pub fn elapsed(&mut self, elapsed: Duration) -> io::Result<()> {
        crate::timing::report_elapsed(&mut *self.out, elapsed)?;
        self.out.flush()
    }

    // -------------------------------------------------------------------------

    fn fault(&mut self, fault: &Fault) -> io::Result<()> {
        self.err
            .set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))?;
        write!(self.err, "{}", fault.kind())?;
        self.err.reset()?;
        writeln!(self.err, ": {}", fault.message())?;

        for cause in fault.chain().skip(1) {
            writeln!(self.err, "  caused by: {}", cause)?;
        }
        if let Some(location) = fault.location() {
            writeln!(self.err, "  --> {}", location)?;
        }
        for binding in fault.bindings() {
            writeln!(self.err, "  {} = {}", binding.name, binding.value)?;
        }
        if let Some(backtrace) = fault.backtrace() {
            writeln!(self.err, "{}", backtrace)?;
        }

        if self.expand_diagnostics {
            if let Some(expansion) = expand::expand(fault) {
                self.expansion(&expansion)?;
            }
        }
        Ok(())
    }

    fn expansion(&mut self, expansion: &Expansion) -> io::Result<()> {
        writeln!(self.err, "{}", expansion.original)?;
        if expansion.is_informative() {
            self.err.set_color(ColorSpec::new().set_dimmed(true))?;
            write!(self.err, "    {}", expansion.expanded)?;
            self.err.reset()?;
            writeln!(self.err)?;
        }
        Ok(())
    }
}

fn status_color(status: Status) -> ColorSpec {
    let mut spec = ColorSpec::new();
    match status {
        Status::Passed => spec.set_fg(Some(Color::Green)),
        Status::Skipped => spec.set_fg(Some(Color::Yellow)),
        Status::Failed => spec.set_fg(Some(Color::Red)).set_bold(true),
    };
    spec
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fault::{Binding, Location};
    use termcolor::Buffer;

    #[derive(Debug, thiserror::Error)]
    #[error("attempt to divide by zero")]
    struct DivideByZero;

    fn render(f: impl FnOnce(&mut Reporter<'_>) -> io::Result<()>) -> (String, String) {
        let mut out = Buffer::no_color();
        let mut err = Buffer::no_color();
        {
            let mut reporter = Reporter::new(&mut out, &mut err, true);
            f(&mut reporter).unwrap();
        }
        (
            String::from_utf8(out.into_inner()).unwrap(),
            String::from_utf8(err.into_inner()).unwrap(),
        )
    }

    #[test]
    fn case_lines_are_prefix_plus_label() {
        let (out, err) = render(|r| {
            r.case_started("alpha")?;
            r.case_finished(Status::Passed)?;
            r.case_started("beta")?;
            r.case_finished(Status::Skipped)
        });
        assert_eq!(out, "Testing alpha: PASS\nTesting beta: NOT RUN\n");
        assert!(err.is_empty());
    }

    #[test]
    fn summary_counts_every_status() {
        let report = SuiteReport {
            passed: 2,
            skipped: 1,
            failed: 1,
            elapsed: Duration::ZERO,
        };
        let (out, _) = render(|r| r.summary(&report));
        assert_eq!(out, "\n4 tests, 2 PASS, 1 NOT RUN, 1 FAIL\n");
    }

    #[test]
    fn reasons_go_to_the_error_stream() {
        let failure = Failure::Reason("No exception was raised (expected DivideByZero).".into());
        let (out, err) = render(|r| r.failure(&failure));
        assert!(out.is_empty());
        assert_eq!(err, "No exception was raised (expected DivideByZero).\n");
    }

    #[test]
    fn faults_show_kind_location_and_bindings() {
        let fault = Fault::unlocated(DivideByZero)
            .at(Location {
                file: "does/not/exist.rs".into(),
                line: 3,
                column: 9,
            })
            .with_bindings(vec![Binding::new("b", "0")]);
        let (_, err) = render(|r| r.failure(&Failure::Fault(fault)));
        assert!(err.starts_with("DivideByZero: attempt to divide by zero\n"));
        assert!(err.contains("  --> does/not/exist.rs:3:9\n"));
        assert!(err.contains("  b = 0\n"));
    }
}
