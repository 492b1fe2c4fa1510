//! Command-line argument definitions.

use clap::Parser;

/// Routes links through the sample route table and prints where each one
/// navigated to.
#[derive(Parser, Debug)]
#[command(name = "linkroute", version, about)]
pub(crate) struct Cli {
    /// Name supplied to commands that require a login.
    ///
    /// Without it such commands are cancelled.
    #[arg(long, value_name = "NAME")]
    pub(crate) login: Option<String>,
    /// Links to route, in order.
    #[arg(value_name = "URI", required = true, num_args = 1..)]
    pub(crate) uris: Vec<String>,
}
