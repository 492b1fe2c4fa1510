//! Routes the command-line links through a controller and reports results.

use std::io::Write;
use std::process::ExitCode;

use linkroute::{Outcome, RequirementTag, RouterController, RouterEvent};
use linkroute_config::Config;
use tokio::task::LocalSet;
use tracing::{info, warn};

use crate::cli::Cli;
use crate::commands::{LoginResult, Navigator, Screen, sample_router};
use crate::errors::EXIT_NOT_COMPLETED;
use crate::{AppError, IoStreams};

const SESSION_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::session");

/// What happened to one link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum LinkReport {
    /// The command completed; carries the screen it navigated to, if any.
    Navigated(Option<Screen>),
    /// The link repeated the previous one and was suppressed.
    Repeated,
    /// No route matches the link.
    Unmatched,
    /// The command was cancelled or faulted.
    Cancelled,
}

impl LinkReport {
    const fn is_failure(&self) -> bool {
        matches!(self, Self::Unmatched | Self::Cancelled)
    }
}

/// Routes every link in `cli` on a fresh current-thread runtime.
pub(crate) fn route_links<W: Write, E: Write>(
    cli: &Cli,
    config: &Config,
    io: &mut IoStreams<'_, W, E>,
) -> Result<ExitCode, AppError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .map_err(AppError::Runtime)?;
    let mut session = Session::new(config, cli.login.clone())?;
    LocalSet::new().block_on(&runtime, async {
        let mut failed = false;
        for uri in &cli.uris {
            let report = session.route(uri).await?;
            failed |= report.is_failure();
            write_report(io, uri, &report)?;
        }
        session.controller.shutdown().await;
        let exit_code = if failed {
            ExitCode::from(EXIT_NOT_COMPLETED)
        } else {
            ExitCode::SUCCESS
        };
        Ok::<_, AppError>(exit_code)
    })
}

fn write_report<W: Write, E: Write>(
    io: &mut IoStreams<'_, W, E>,
    uri: &str,
    report: &LinkReport,
) -> Result<(), AppError> {
    let written = match report {
        LinkReport::Navigated(Some(screen)) => writeln!(io.stdout, "{screen}"),
        LinkReport::Navigated(None) => writeln!(io.stderr, "{uri}: completed without navigation"),
        LinkReport::Repeated => writeln!(io.stderr, "{uri}: ignored repeated link"),
        LinkReport::Unmatched => writeln!(io.stderr, "{uri}: no route matches"),
        LinkReport::Cancelled => writeln!(io.stderr, "{uri}: command cancelled"),
    };
    written.map_err(AppError::WriteOutput)
}

pub(crate) struct Session {
    controller: RouterController<Navigator>,
    navigator: Navigator,
    login: Option<String>,
}

impl Session {
    pub(crate) fn new(config: &Config, login: Option<String>) -> Result<Self, AppError> {
        let controller =
            RouterController::new(sample_router()?).with_dedupe(config.dedupe_links());
        controller.enable_logging(config.router_logging());
        Ok(Self {
            controller,
            navigator: Navigator::default(),
            login,
        })
    }

    /// Routes `uri` and waits until its command has finished.
    ///
    /// Must run inside a [`LocalSet`].
    pub(crate) async fn route(&mut self, uri: &str) -> Result<LinkReport, AppError> {
        if self.controller.is_repeat(uri) {
            return Ok(LinkReport::Repeated);
        }
        if !self.controller.route(uri)? {
            return Ok(LinkReport::Unmatched);
        }

        while let Some(event) = self.controller.next_event().await {
            match event {
                RouterEvent::Requirement(tag) => self.answer(tag),
                RouterEvent::Completed(Outcome::Complete(navigation)) => {
                    if navigation.is_noop() {
                        return Ok(LinkReport::Navigated(None));
                    }
                    navigation.navigate(&mut self.navigator);
                    return Ok(LinkReport::Navigated(self.navigator.current().cloned()));
                }
                RouterEvent::Completed(Outcome::Cancelled) => return Ok(LinkReport::Cancelled),
            }
        }
        Ok(LinkReport::Cancelled)
    }

    fn answer(&mut self, tag: RequirementTag) {
        match (&self.login, tag.is::<LoginResult>()) {
            (Some(name), true) => {
                info!(target: SESSION_TARGET, user = %name, "supplying login");
                let login = LoginResult { name: name.clone() };
                let satisfaction = self.controller.satisfy(login);
                if !satisfaction.is_fulfilled() {
                    warn!(target: SESSION_TARGET, ?satisfaction, "login was not accepted");
                }
            }
            (None, true) => {
                warn!(target: SESSION_TARGET, "login required but none supplied; cancelling");
                self.controller.cancel_command();
            }
            (_, false) => {
                warn!(target: SESSION_TARGET, %tag, "cannot satisfy requirement; cancelling");
                self.controller.cancel_command();
            }
        }
    }
}
