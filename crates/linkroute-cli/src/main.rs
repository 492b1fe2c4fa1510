//! Entry point for the `linkroute` binary.
//!
//! Delegates to [`linkroute_cli::run`], which loads configuration, routes each
//! link through the sample route table, and reports where navigation ended.

use std::io::{self, StderrLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    linkroute_cli::run(std::env::args_os(), &mut stdout, &mut stderr)
}
