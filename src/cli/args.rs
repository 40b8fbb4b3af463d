//! Command-line arguments for suite runners.
//!
//! Uses `clap`'s derive API; every flag overrides the corresponding key of
//! an optional YAML config file.

use crate::config::RunConfig;
use crate::errors::ConfigError;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "swallow",
    version,
    about = "Run a swallow test suite and report PASS / NOT RUN / FAIL per case."
)]
pub struct Args {
    /// Let hooks write to stdout instead of hiding it.
    #[arg(long)]
    pub nocapture: bool,

    /// Do not print the failing line with captured values substituted.
    #[arg(long)]
    pub no_expand: bool,

    /// When to colorize the report.
    #[arg(long, value_enum, default_value_t = ColorMode::Auto)]
    pub color: ColorMode,

    /// YAML file with `capture_output`, `expand_diagnostics` and `use_colors`.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

impl Args {
    /// The config file (or defaults) with command-line flags applied on top.
    pub fn into_config(self) -> Result<RunConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => RunConfig::load(path)?,
            None => RunConfig::default(),
        };
        if self.nocapture {
            config.capture_output = false;
        }
        if self.no_expand {
            config.expand_diagnostics = false;
        }
        match self.color {
            ColorMode::Auto => {}
            ColorMode::Always => config.use_colors = true,
            ColorMode::Never => config.use_colors = false,
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("swallow").chain(argv.iter().copied())).unwrap()
    }

    #[test]
    fn flags_override_defaults() {
        let config = parse(&["--nocapture", "--no-expand", "--color", "never"])
            .into_config()
            .unwrap();
        assert!(!config.capture_output);
        assert!(!config.expand_diagnostics);
        assert!(!config.use_colors);
    }

    #[test]
    fn no_flags_keeps_capture_and_expansion() {
        let config = parse(&[]).into_config().unwrap();
        assert!(config.capture_output);
        assert!(config.expand_diagnostics);
    }

    #[test]
    fn flags_apply_on_top_of_the_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "capture_output: false\nuse_colors: false").unwrap();
        let path = file.path().to_str().unwrap();
        let config = parse(&["--config", path, "--color", "always"])
            .into_config()
            .unwrap();
        assert!(!config.capture_output);
        assert!(config.use_colors);
    }

    #[test]
    fn unknown_color_mode_is_rejected() {
        assert!(Args::try_parse_from(["swallow", "--color", "sometimes"]).is_err());
    }
}
