//! Router core: dispatch, the single-command gate, and the requirement
//! handshake.
//!
//! The router is either Idle or Running exactly one command. [`Router::route`]
//! resolves a link through the [`Registry`], creates the command under a child
//! of the router's supervisor, executes it, and schedules a watcher on the
//! current [`LocalSet`](tokio::task::LocalSet). The watcher waits until every
//! task the command spawned has settled, returns the router to Idle, and
//! delivers the [`Outcome`] to the completion callback.
//!
//! A command may suspend through [`CommandScope::require`]. The router then
//! notifies its requirement listener; the host answers with
//! [`Router::satisfy`].

pub(crate) mod state;

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use tokio_util::task::TaskTracker;
use tracing::{debug, error};

use crate::command::{Command, CommandScope, Outcome};
use crate::error::RouterError;
use crate::link::Link;
use crate::registry::{Registry, RouteGroup};
use crate::requirement::{RequirementTag, Satisfaction};
use crate::scope::{Supervisor, panic_message};

use self::state::{ROUTER_TARGET, RouterShared};
pub use self::state::RequirementNotifier;

/// Routes links to commands and supervises the running command.
///
/// The router is single-threaded: it must be driven from within a
/// [`LocalSet`](tokio::task::LocalSet), and every callback it invokes runs on
/// that same local set.
pub struct Router<C> {
    registry: Registry<C>,
    supervisor: Supervisor,
    watchers: TaskTracker,
    shared: Rc<RouterShared>,
}

impl<C: 'static> Default for Router<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: 'static> Router<C> {
    /// Creates a router with no registered groups.
    #[must_use]
    pub fn new() -> Self {
        Self::with_registry(Registry::new())
    }

    /// Creates a router over an existing registry.
    #[must_use]
    pub fn with_registry(registry: Registry<C>) -> Self {
        Self {
            registry,
            supervisor: Supervisor::new(),
            watchers: TaskTracker::new(),
            shared: Rc::new(RouterShared::new()),
        }
    }

    /// Registers a route group after the existing ones.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::Registry`] when the group has no scheme or no
    /// host patterns.
    pub fn register(&mut self, group: RouteGroup<C>) -> Result<usize, RouterError> {
        Ok(self.registry.register(group)?)
    }

    /// Appends routes to an already registered group.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::Registry`] when no group exists at `index`.
    pub fn extend_group(
        &mut self,
        index: usize,
        routes: RouteGroup<C>,
    ) -> Result<(), RouterError> {
        self.registry
            .extend_group(index, routes)
            .map_err(RouterError::from)
    }

    /// The route registry.
    #[must_use]
    pub const fn registry(&self) -> &Registry<C> {
        &self.registry
    }

    /// Installs the listener told whenever a command starts waiting for a
    /// value.
    pub fn on_requirement(&self, notifier: impl Fn(RequirementTag) + 'static) {
        self.shared.set_notifier(Rc::new(notifier));
    }

    /// Switches lifecycle logging on or off.
    pub fn enable_logging(&self, enabled: bool) {
        self.shared.log.set_enabled(enabled);
    }

    /// Returns `true` when lifecycle logging is on.
    #[must_use]
    pub fn logging_enabled(&self) -> bool {
        self.shared.log.is_enabled()
    }

    /// Dispatches `uri` to the first matching route.
    ///
    /// Returns `Ok(false)` when no route matches or `uri` cannot be parsed;
    /// nothing runs and `on_complete` is dropped uncalled. Returns `Ok(true)`
    /// once the command has been executed; its outcome arrives later through
    /// `on_complete`.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::CommandInFlight`] while another command is
    /// running and [`RouterError::ShutDown`] after [`Router::cancel`].
    ///
    /// # Panics
    ///
    /// Panics when a route matches and the call is made outside a
    /// [`LocalSet`](tokio::task::LocalSet).
    pub fn route(
        &self,
        uri: &str,
        on_complete: impl FnOnce(Outcome<C>) + 'static,
    ) -> Result<bool, RouterError> {
        self.ensure_accepting()?;
        match Link::parse(uri) {
            Ok(link) => self.dispatch(link, Box::new(on_complete)),
            Err(error) => {
                self.shared
                    .log
                    .event("No Match", format_args!("cannot parse '{uri}': {error}"));
                Ok(false)
            }
        }
    }

    /// Dispatches an already parsed link. See [`Router::route`].
    ///
    /// # Errors
    ///
    /// As [`Router::route`].
    ///
    /// # Panics
    ///
    /// As [`Router::route`].
    pub fn route_link(
        &self,
        link: Link,
        on_complete: impl FnOnce(Outcome<C>) + 'static,
    ) -> Result<bool, RouterError> {
        self.ensure_accepting()?;
        self.dispatch(link, Box::new(on_complete))
    }

    fn ensure_accepting(&self) -> Result<(), RouterError> {
        if let Some(command) = self.shared.running_command() {
            return Err(RouterError::CommandInFlight { command });
        }
        if self.supervisor.is_cancelled() {
            return Err(RouterError::ShutDown);
        }
        Ok(())
    }

    fn dispatch(
        &self,
        link: Link,
        on_complete: Box<dyn FnOnce(Outcome<C>)>,
    ) -> Result<bool, RouterError> {
        let route = match self.registry.resolve(&link) {
            Ok(route) => route,
            Err(reason) => {
                self.shared
                    .log
                    .event("No Match", format_args!("{reason} for {link}"));
                return Ok(false);
            }
        };

        let mut command = route.create_command();
        let name = command.name();
        let supervisor = self.supervisor.child();
        let scope = CommandScope::new(name, link, supervisor.clone(), Rc::clone(&self.shared));
        self.shared.enter_running(name, supervisor.clone());
        self.shared
            .log
            .event("Execute Command", format_args!("{name} for {}", scope.link()));

        if let Err(panic) = panic::catch_unwind(AssertUnwindSafe(|| command.execute(&scope))) {
            error!(
                target: ROUTER_TARGET,
                command = name,
                panic = panic_message(panic.as_ref()),
                "command panicked during execute; cancelling"
            );
            supervisor.cancel();
        }

        let shared = Rc::clone(&self.shared);
        self.watchers.spawn_local(async move {
            supervisor.settled().await;
            shared.enter_idle();
            let outcome = if supervisor.is_cancelled() {
                shared.log.event("Command Cancelled", format_args!("{name}"));
                Outcome::Cancelled
            } else {
                shared.log.event("Command Complete", format_args!("{name}"));
                Outcome::Complete(scope.take_navigation())
            };
            drop(command);
            on_complete(outcome);
        });
        Ok(true)
    }

    /// Offers `value` to the outstanding requirement.
    ///
    /// Only a value whose type matches the requirement resolves it. Every
    /// other case is logged and leaves the router unchanged.
    pub fn satisfy<T: Any>(&self, value: T) -> Satisfaction {
        self.shared
            .satisfy(Box::new(value), RequirementTag::of::<T>())
    }

    /// Cancels the running command, if any.
    ///
    /// Its pending work stops at the next suspension point, an outstanding
    /// requirement resolves as cancelled, and the completion callback receives
    /// [`Outcome::Cancelled`].
    pub fn cancel_command(&self) {
        if let Some(supervisor) = self.shared.running_supervisor() {
            let command = self.shared.running_command().unwrap_or_default();
            self.shared
                .log
                .event("Command Cancelling", format_args!("{command}"));
            supervisor.cancel();
            self.shared.clear_requirement();
        }
    }

    /// Cancels the router and every command descending from it.
    ///
    /// The router refuses further routing afterwards.
    pub fn cancel(&self) {
        debug!(target: ROUTER_TARGET, "cancelling router");
        self.supervisor.cancel();
        self.shared.clear_requirement();
    }

    /// Cancels the router and waits until every completion callback has run.
    pub async fn shutdown(&self) {
        self.cancel();
        self.watchers.close();
        self.watchers.wait().await;
    }

    /// Resolves once no command is running.
    pub async fn wait_idle(&self) {
        self.shared.wait_idle().await;
    }

    /// Returns `true` while a command is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.shared.running_command().is_some()
    }

    /// Name of the running command.
    #[must_use]
    pub fn running_command(&self) -> Option<&'static str> {
        self.shared.running_command()
    }

    /// Tag of the requirement currently awaiting a value.
    #[must_use]
    pub fn outstanding_requirement(&self) -> Option<RequirementTag> {
        self.shared.outstanding_requirement()
    }

    /// Returns `true` once [`Router::cancel`] has been called.
    #[must_use]
    pub fn is_shut_down(&self) -> bool {
        self.supervisor.is_cancelled()
    }

    /// Number of tasks the running command still has in flight.
    #[must_use]
    pub fn active_command_tasks(&self) -> usize {
        self.shared
            .running_supervisor()
            .map_or(0, |supervisor| supervisor.active_tasks())
    }
}

impl<C> Drop for Router<C> {
    fn drop(&mut self) {
        self.supervisor.cancel();
    }
}

impl<C> std::fmt::Debug for Router<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("registry", &self.registry)
            .field("running", &self.shared.running_command())
            .field("shut_down", &self.supervisor.is_cancelled())
            .finish_non_exhaustive()
    }
}
