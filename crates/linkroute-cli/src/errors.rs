//! Error types for the CLI runtime.

use std::io;
use std::process::ExitCode;
use std::sync::Arc;

use linkroute::RouterError;
use thiserror::Error;

use crate::telemetry::TelemetryError;

/// Exit status when a link was not routed to completion.
pub(crate) const EXIT_NOT_COMPLETED: u8 = 1;

/// Exit status for configuration, telemetry, and router failures.
pub(crate) const EXIT_ERROR: u8 = 2;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<ortho_config::OrthoError>),
    #[error("{0}")]
    CliUsage(clap::Error),
    #[error("failed to initialise telemetry: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("router error: {0}")]
    Router(#[from] RouterError),
    #[error("failed to start the async runtime: {0}")]
    Runtime(io::Error),
    #[error("failed to write output: {0}")]
    WriteOutput(io::Error),
}

impl AppError {
    /// Process exit status reported for this error.
    pub(crate) fn exit_code(&self) -> ExitCode {
        ExitCode::from(EXIT_ERROR)
    }
}
