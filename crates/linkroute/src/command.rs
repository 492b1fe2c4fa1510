//! Commands and the scope they run in.
//!
//! A [`Command`] is created for each routed link and executed once. Its
//! [`CommandScope`] carries the bound [`Link`], spawns supervised sub-work,
//! records the navigation action reported on completion, and lets sub-work
//! suspend until the host supplies a value.

use std::any::{Any, type_name};
use std::cell::RefCell;
use std::fmt;
use std::future::Future;
use std::rc::Rc;

use tokio::task::JoinHandle;
use tracing::warn;

use crate::error::RequireError;
use crate::link::Link;
use crate::requirement::{RequirementTag, short_type_name};
use crate::router::state::RouterShared;
use crate::scope::Supervisor;

/// Tracing target for command faults.
pub(crate) const COMMAND_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::command");

/// A unit of work bound to a routed link.
///
/// `C` is the host context handed to the navigation action once the command
/// completes.
pub trait Command<C> {
    /// Starts the command.
    ///
    /// Called exactly once, synchronously, right after the command is bound to
    /// its link. Asynchronous work must be spawned through `scope` so the
    /// router can tell when the command has finished.
    fn execute(&mut self, scope: &CommandScope<C>);

    /// Name used in log lines and diagnostics.
    fn name(&self) -> &'static str {
        short_type_name(type_name::<Self>())
    }
}

/// Action run by the host once a command completes.
pub struct Navigation<C> {
    action: Option<Box<dyn FnOnce(&mut C)>>,
}

impl<C> Navigation<C> {
    /// Wraps `action`.
    #[must_use]
    pub fn new(action: impl FnOnce(&mut C) + 'static) -> Self {
        Self {
            action: Some(Box::new(action)),
        }
    }

    /// A navigation that does nothing.
    #[must_use]
    pub const fn noop() -> Self {
        Self { action: None }
    }

    /// Returns `true` when no action was declared.
    #[must_use]
    pub const fn is_noop(&self) -> bool {
        self.action.is_none()
    }

    /// Runs the action against the host context.
    pub fn navigate(self, context: &mut C) {
        if let Some(action) = self.action {
            action(context);
        }
    }
}

impl<C> Default for Navigation<C> {
    fn default() -> Self {
        Self::noop()
    }
}

impl<C> fmt::Debug for Navigation<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Navigation")
            .field("noop", &self.is_noop())
            .finish()
    }
}

/// How a routed command ended.
#[derive(Debug)]
pub enum Outcome<C> {
    /// All of the command's work finished; carries its navigation action.
    Complete(Navigation<C>),
    /// The command was cancelled, or faulted.
    Cancelled,
}

impl<C> Outcome<C> {
    /// Returns `true` for [`Outcome::Complete`].
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        matches!(self, Self::Complete(_))
    }

    /// Returns `true` for [`Outcome::Cancelled`].
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Handle a command uses to reach its link, its supervisor and the router.
///
/// Cloning is cheap; clones can be moved into spawned work.
pub struct CommandScope<C> {
    command: &'static str,
    link: Rc<Link>,
    supervisor: Supervisor,
    navigation: Rc<RefCell<Navigation<C>>>,
    shared: Rc<RouterShared>,
}

impl<C> Clone for CommandScope<C> {
    fn clone(&self) -> Self {
        Self {
            command: self.command,
            link: Rc::clone(&self.link),
            supervisor: self.supervisor.clone(),
            navigation: Rc::clone(&self.navigation),
            shared: Rc::clone(&self.shared),
        }
    }
}

impl<C: 'static> CommandScope<C> {
    pub(crate) fn new(
        command: &'static str,
        link: Link,
        supervisor: Supervisor,
        shared: Rc<RouterShared>,
    ) -> Self {
        Self {
            command,
            link: Rc::new(link),
            supervisor,
            navigation: Rc::new(RefCell::new(Navigation::noop())),
            shared,
        }
    }

    /// Creates a scope that is not attached to any router.
    ///
    /// Useful for exercising a command's link projections in isolation.
    /// Requirements raised from a standalone scope are never satisfied.
    #[must_use]
    pub fn standalone(link: Link) -> Self {
        Self::new(
            "standalone",
            link,
            Supervisor::new(),
            Rc::new(RouterShared::new()),
        )
    }

    /// The bound link.
    #[must_use]
    pub fn link(&self) -> &Link {
        &self.link
    }

    /// Path segment at `index` of the bound link.
    #[must_use]
    pub fn path_segment(&self, index: usize) -> Option<&str> {
        self.link.path_segment(index)
    }

    /// First value of the query parameter `name` of the bound link.
    #[must_use]
    pub fn query_param(&self, name: &str) -> Option<String> {
        self.link.query_param(name)
    }

    /// Declares the navigation reported on completion.
    ///
    /// Later calls replace earlier ones.
    pub fn navigate(&self, action: impl FnOnce(&mut C) + 'static) {
        *self.navigation.borrow_mut() = Navigation::new(action);
    }

    /// Spawns work bound to this command's lifetime.
    ///
    /// # Panics
    ///
    /// Panics when called outside a [`LocalSet`](tokio::task::LocalSet).
    #[expect(
        clippy::must_use_candidate,
        reason = "dropping the handle detaches the task"
    )]
    pub fn spawn<F>(&self, work: F) -> JoinHandle<()>
    where
        F: Future<Output = ()> + 'static,
    {
        self.supervisor.spawn(work)
    }

    /// Spawns work whose error cancels the command.
    ///
    /// # Panics
    ///
    /// Panics when called outside a [`LocalSet`](tokio::task::LocalSet).
    #[expect(
        clippy::must_use_candidate,
        reason = "dropping the handle detaches the task"
    )]
    pub fn spawn_fallible<F, E>(&self, work: F) -> JoinHandle<()>
    where
        F: Future<Output = Result<(), E>> + 'static,
        E: fmt::Display + 'static,
    {
        let supervisor = self.supervisor.clone();
        let command = self.command;
        self.supervisor.spawn(async move {
            if let Err(error) = work.await {
                warn!(
                    target: COMMAND_TARGET,
                    command,
                    %error,
                    "command work failed; cancelling command"
                );
                supervisor.cancel();
            }
        })
    }

    /// Suspends until the host supplies a value of type `T`.
    ///
    /// The router notifies its requirement listener with `T`'s tag and resumes
    /// this call when [`Router::satisfy`](crate::Router::satisfy) receives a
    /// `T`.
    ///
    /// # Errors
    ///
    /// Returns [`RequireError::AlreadyOutstanding`] when another requirement
    /// is pending, and [`RequireError::Cancelled`] when the command is
    /// cancelled before a value arrives.
    pub async fn require<T: Any>(&self) -> Result<T, RequireError> {
        let requirement = RequirementTag::of::<T>();
        let (_guard, receiver) = self
            .shared
            .begin_requirement::<T>(self.command, self.supervisor.token())?;
        self.shared.notify_requirement(requirement);

        tokio::select! {
            biased;
            () = self.supervisor.cancelled() => Err(RequireError::Cancelled { requirement }),
            received = receiver => {
                received.map_err(|_| RequireError::Cancelled { requirement })
            }
        }
    }

    /// Returns `true` once the command has been cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.supervisor.is_cancelled()
    }

    /// The command's supervisor.
    #[must_use]
    pub const fn supervisor(&self) -> &Supervisor {
        &self.supervisor
    }

    pub(crate) fn take_navigation(&self) -> Navigation<C> {
        std::mem::take(&mut *self.navigation.borrow_mut())
    }
}

impl<C> fmt::Debug for CommandScope<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandScope")
            .field("command", &self.command)
            .field("link", &self.link.to_string())
            .field("cancelled", &self.supervisor.is_cancelled())
            .finish_non_exhaustive()
    }
}
