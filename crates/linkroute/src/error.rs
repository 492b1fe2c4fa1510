//! Error types for route registration, dispatch, and requirement waits.
//!
//! Registration problems are configuration errors and are reported when a
//! group is registered. Dispatch errors are contract violations by the host.
//! Requirement errors surface inside command work when a suspended command
//! cannot obtain its value.

use thiserror::Error;

use crate::requirement::RequirementTag;

/// Errors raised while registering route groups.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The group declared no scheme patterns.
    #[error("route group must declare at least one scheme pattern")]
    MissingSchemes,

    /// The group declared no host patterns.
    #[error("route group must declare at least one host pattern")]
    MissingHosts,

    /// A scheme, host, or path pattern is not a valid regular expression.
    #[error("invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        /// Pattern text as supplied by the caller.
        pattern: String,
        /// Underlying regex compilation error.
        #[source]
        source: Box<regex::Error>,
    },

    /// No group has been registered at the requested index.
    #[error("no route group registered at index {index}")]
    UnknownGroup {
        /// Index that was looked up.
        index: usize,
    },
}

impl RegistryError {
    /// Creates an invalid pattern error.
    #[must_use]
    pub fn invalid_pattern(pattern: impl Into<String>, source: regex::Error) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            source: Box::new(source),
        }
    }

    /// Creates an unknown group error.
    #[must_use]
    pub const fn unknown_group(index: usize) -> Self {
        Self::UnknownGroup { index }
    }
}

/// Errors surfaced by the router's control surface.
#[derive(Debug, Error)]
pub enum RouterError {
    /// `route` was called while another command is still running.
    #[error(
        "cannot run two commands at once: '{command}' is still running; \
         cancel it or wait for its completion first"
    )]
    CommandInFlight {
        /// Name of the running command.
        command: &'static str,
    },

    /// The router has been cancelled and accepts no further work.
    #[error("router has been shut down")]
    ShutDown,

    /// Route registration failed.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Errors returned to a command waiting on an external value.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RequireError {
    /// Another requirement is still awaiting a value.
    #[error("cannot require {requested} while {pending} is still outstanding")]
    AlreadyOutstanding {
        /// Requirement that is still pending.
        pending: RequirementTag,
        /// Requirement that was rejected.
        requested: RequirementTag,
    },

    /// The command was cancelled before the requirement was satisfied.
    #[error("requirement for {requirement} was cancelled")]
    Cancelled {
        /// Requirement that was abandoned.
        requirement: RequirementTag,
    },
}

impl RequireError {
    /// Returns `true` when the wait ended because of cancellation.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}
