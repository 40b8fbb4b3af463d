//! Run configuration.
//!
//! A [`RunConfig`] can be built in code, loaded from a YAML file, or produced
//! from command-line arguments (see [`cli::Args`](crate::cli::Args)). Every
//! key is optional:
//!
//! ```yaml
//! capture_output: true      # hide stdout written by hooks
//! expand_diagnostics: true  # show the failing line with values substituted
//! use_colors: false         # defaults to whether stdout is a terminal
//! ```

use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use termcolor::ColorChoice;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    pub capture_output: bool,
    pub expand_diagnostics: bool,
    pub use_colors: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            capture_output: true,
            expand_diagnostics: true,
            use_colors: atty::is(atty::Stream::Stdout),
        }
    }
}

impl RunConfig {
    pub fn from_yaml_str(source: &str) -> Result<Self, ConfigError> {
        // An empty document deserializes as `null`, not as an empty map.
        if source.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(source)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&source)
    }

    pub fn color_choice(&self) -> ColorChoice {
        if self.use_colors {
            ColorChoice::Always
        } else {
            ColorChoice::Never
        }
    }

    /// Plain output with capture and expansion on; handy for tests.
    pub fn plain() -> Self {
        Self {
            use_colors: false,
            ..Self::default()
        }
    }
}
