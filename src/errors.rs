//! Swallow Error Handling
//!
//! Two tiers of errors exist in the engine:
//!
//! - **Registration errors** are returned synchronously while a test case is
//!   being built. They describe programmer mistakes (a hook that cannot be
//!   invoked without arguments, a value that is not invocable at all) and the
//!   case is never added to a suite.
//! - **Run-time faults** are never errors at this level. Anything a setup,
//!   body or teardown raises is captured as a [`Fault`](crate::Fault) and
//!   becomes data inside a [`RunOutcome`](crate::RunOutcome).
//!
//! Configuration loading has its own small error type.

use miette::Diagnostic;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

// ============================================================================
// HOOK ROLES
// ============================================================================

/// The position a callable occupies inside a test case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Setup,
    Body,
    Teardown,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Setup => "setup",
            Role::Body => "body",
            Role::Teardown => "teardown",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// REGISTRATION ERRORS
// ============================================================================

/// Raised when a test case (or a suite's default hooks) cannot be registered.
#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    #[error("{role} of `{case}` isn't callable: {value}")]
    #[diagnostic(
        code(swallow::registration::not_callable),
        help("pass a closure or function that takes no arguments")
    )]
    NotCallable {
        role: Role,
        case: String,
        value: String,
    },

    #[error("{role} of `{case}` isn't callable without positional arguments (requires {required})")]
    #[diagnostic(
        code(swallow::registration::requires_arguments),
        help("give the remaining parameters defaults, or wrap the call in a zero-argument closure")
    )]
    RequiresArguments {
        role: Role,
        case: String,
        required: usize,
    },
}

impl RegistrationError {
    pub fn role(&self) -> Role {
        match self {
            RegistrationError::NotCallable { role, .. } => *role,
            RegistrationError::RequiresArguments { role, .. } => *role,
        }
    }
}

// ============================================================================
// CONFIGURATION ERRORS
// ============================================================================

/// Failure to load a [`RunConfig`](crate::RunConfig).
#[derive(Error, Diagnostic, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {}", .path.display())]
    #[diagnostic(code(swallow::config::read))]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    #[diagnostic(
        code(swallow::config::parse),
        help("expected keys: capture_output, expand_diagnostics, use_colors")
    )]
    Parse(#[from] serde_yaml::Error),
}
