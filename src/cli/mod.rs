//! Entry point helpers for suite-runner binaries.
//!
//! A runner binary builds its [`Suite`] and hands it to [`run`], which parses
//! the command line, installs logging, runs the suite and maps the result to
//! a process exit code.

use crate::suite::Suite;
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

pub mod args;

pub use args::{Args, ColorMode};

/// Exit code for an unusable configuration or a broken output stream.
const EXIT_USAGE: u8 = 2;

/// Parses arguments, runs `suite` and returns the exit code: success when
/// nothing failed, 1 when a case failed.
pub fn run(suite: &Suite) -> ExitCode {
    init_tracing();

    let config = match Args::parse().into_config() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{:?}", miette::Report::new(err));
            return ExitCode::from(EXIT_USAGE);
        }
    };

    match suite.run(&config) {
        Ok(report) if report.has_failures() => ExitCode::FAILURE,
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: could not write the report: {}", err);
            ExitCode::from(EXIT_USAGE)
        }
    }
}

/// Installs a stderr `tracing` subscriber filtered by `RUST_LOG` (default
/// `warn`). A subscriber that is already installed is left in place.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
