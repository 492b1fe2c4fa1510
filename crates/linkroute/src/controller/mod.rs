//! Host-facing adaptor around a [`Router`].
//!
//! The controller turns the router's callbacks into a stream of
//! [`RouterEvent`]s that a host loop consumes one at a time, and suppresses
//! repeated delivery of the same link (for example when a host screen is
//! rebuilt and hands the same inbound link over again).

use tokio::sync::mpsc;
use tracing::debug;

use crate::command::Outcome;
use crate::error::RouterError;
use crate::requirement::{RequirementTag, Satisfaction};
use crate::router::Router;

/// Tracing target for controller decisions.
const CONTROLLER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::controller");

/// Something the host must react to.
#[derive(Debug)]
pub enum RouterEvent<C> {
    /// The routed command finished.
    Completed(Outcome<C>),
    /// A command is waiting for a value of the tagged type.
    Requirement(RequirementTag),
}

/// Wraps a router, queueing its callbacks as events.
///
/// Dropping the controller drops the router, which cancels any running
/// command.
#[derive(Debug)]
pub struct RouterController<C> {
    router: Router<C>,
    sender: mpsc::UnboundedSender<RouterEvent<C>>,
    events: mpsc::UnboundedReceiver<RouterEvent<C>>,
    last_link: Option<String>,
    dedupe_links: bool,
}

impl<C: 'static> RouterController<C> {
    /// Takes ownership of `router` and subscribes to its requirements.
    #[must_use]
    pub fn new(router: Router<C>) -> Self {
        let (sender, events) = mpsc::unbounded_channel();
        let requirements = sender.clone();
        router.on_requirement(move |tag| {
            if requirements.send(RouterEvent::Requirement(tag)).is_err() {
                debug!(target: CONTROLLER_TARGET, %tag, "requirement event dropped");
            }
        });
        Self {
            router,
            sender,
            events,
            last_link: None,
            dedupe_links: true,
        }
    }

    /// Enables or disables suppression of repeated links.
    #[must_use]
    pub const fn with_dedupe(mut self, dedupe_links: bool) -> Self {
        self.dedupe_links = dedupe_links;
        self
    }

    /// The wrapped router.
    #[must_use]
    pub const fn router(&self) -> &Router<C> {
        &self.router
    }

    /// Returns `true` when routing `uri` now would be suppressed as a repeat.
    #[must_use]
    pub fn is_repeat(&self, uri: &str) -> bool {
        self.dedupe_links && self.last_link.as_deref() == Some(uri)
    }

    /// Routes `uri` unless it repeats the last routed link.
    ///
    /// The outcome is delivered later as [`RouterEvent::Completed`].
    ///
    /// # Errors
    ///
    /// Propagates [`RouterError`] from [`Router::route`]; a link that failed
    /// with an error is not remembered.
    ///
    /// # Panics
    ///
    /// As [`Router::route`].
    pub fn route(&mut self, uri: &str) -> Result<bool, RouterError> {
        if self.is_repeat(uri) {
            debug!(target: CONTROLLER_TARGET, uri, "ignoring repeated link");
            return Ok(false);
        }

        let completions = self.sender.clone();
        let routed = self.router.route(uri, move |outcome| {
            if completions.send(RouterEvent::Completed(outcome)).is_err() {
                debug!(target: CONTROLLER_TARGET, "completion event dropped");
            }
        })?;
        self.last_link = Some(uri.to_owned());
        Ok(routed)
    }

    /// Waits for the next event.
    ///
    /// Each event is delivered once. Returns `None` only if the channel has
    /// been closed, which cannot happen while the controller is alive.
    pub async fn next_event(&mut self) -> Option<RouterEvent<C>> {
        self.events.recv().await
    }

    /// Returns an already queued event without waiting.
    pub fn try_next_event(&mut self) -> Option<RouterEvent<C>> {
        self.events.try_recv().ok()
    }

    /// Offers a value to the outstanding requirement.
    pub fn satisfy<T: std::any::Any>(&self, value: T) -> Satisfaction {
        self.router.satisfy(value)
    }

    /// Cancels the running command and forgets the last routed link.
    pub fn cancel_command(&mut self) {
        self.last_link = None;
        self.router.cancel_command();
    }

    /// Switches router lifecycle logging on or off.
    pub fn enable_logging(&self, enabled: bool) {
        self.router.enable_logging(enabled);
    }

    /// Cancels the router and waits for outstanding completions.
    pub async fn shutdown(&self) {
        self.router.shutdown().await;
    }
}
