//! Router-owned state shared with running commands.
//!
//! Only the router and the scopes it hands out touch this state. It holds the
//! Idle/Running phase, the single outstanding requirement, the requirement
//! notifier, and the logging switch.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use tokio::sync::{oneshot, watch};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::RequireError;
use crate::requirement::{PendingRequirement, RequirementTag, Satisfaction};
use crate::scope::Supervisor;

/// Tracing target for router lifecycle events.
pub(crate) const ROUTER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::router");

/// Callback invoked when a command starts waiting for a value.
pub type RequirementNotifier = Rc<dyn Fn(RequirementTag)>;

/// Router phase.
#[derive(Debug, Clone, Default)]
pub(crate) enum RouterState {
    #[default]
    Idle,
    Running {
        command: &'static str,
        supervisor: Supervisor,
    },
}

/// Lifecycle log gated by [`Router::enable_logging`](crate::Router::enable_logging).
#[derive(Debug, Default)]
pub(crate) struct RouterLog {
    enabled: Cell<bool>,
}

impl RouterLog {
    pub(crate) fn set_enabled(&self, enabled: bool) {
        self.enabled.set(enabled);
    }

    pub(crate) fn is_enabled(&self) -> bool {
        self.enabled.get()
    }

    pub(crate) fn event(&self, state: &str, message: fmt::Arguments<'_>) {
        if self.enabled.get() {
            debug!(target: ROUTER_TARGET, state, "{message}");
        }
    }
}

struct Slot {
    id: u64,
    pending: PendingRequirement,
}

pub(crate) struct RouterShared {
    state: watch::Sender<RouterState>,
    requirement: RefCell<Option<Slot>>,
    next_requirement: Cell<u64>,
    notifier: RefCell<RequirementNotifier>,
    pub(crate) log: RouterLog,
}

impl RouterShared {
    pub(crate) fn new() -> Self {
        let (state, _) = watch::channel(RouterState::Idle);
        let notifier: RequirementNotifier = Rc::new(|_: RequirementTag| {});
        Self {
            state,
            requirement: RefCell::new(None),
            next_requirement: Cell::new(0),
            notifier: RefCell::new(notifier),
            log: RouterLog::default(),
        }
    }

    pub(crate) fn running_command(&self) -> Option<&'static str> {
        match &*self.state.borrow() {
            RouterState::Idle => None,
            RouterState::Running { command, .. } => Some(*command),
        }
    }

    pub(crate) fn running_supervisor(&self) -> Option<Supervisor> {
        match &*self.state.borrow() {
            RouterState::Idle => None,
            RouterState::Running { supervisor, .. } => Some(supervisor.clone()),
        }
    }

    pub(crate) fn enter_running(&self, command: &'static str, supervisor: Supervisor) {
        self.state
            .send_replace(RouterState::Running { command, supervisor });
    }

    pub(crate) fn enter_idle(&self) {
        self.state.send_replace(RouterState::Idle);
    }

    pub(crate) async fn wait_idle(&self) {
        let mut phase = self.state.subscribe();
        // The sender lives as long as `self`, so the wait cannot fail.
        drop(
            phase
                .wait_for(|state| matches!(state, RouterState::Idle))
                .await,
        );
    }

    pub(crate) fn set_notifier(&self, notifier: RequirementNotifier) {
        *self.notifier.borrow_mut() = notifier;
    }

    /// Parks a requirement for `T` on behalf of `command`.
    pub(crate) fn begin_requirement<T: Any>(
        self: &Rc<Self>,
        command: &'static str,
        token: &CancellationToken,
    ) -> Result<(RequirementGuard, oneshot::Receiver<T>), RequireError> {
        let requested = RequirementTag::of::<T>();
        if token.is_cancelled() {
            return Err(RequireError::Cancelled {
                requirement: requested,
            });
        }

        let mut slot = self.requirement.borrow_mut();
        if let Some(current) = slot.as_ref().filter(|s| !s.pending.is_cancelled()) {
            return Err(RequireError::AlreadyOutstanding {
                pending: current.pending.tag(),
                requested,
            });
        }

        let id = self.next_requirement.get();
        self.next_requirement.set(id.wrapping_add(1));
        let (pending, receiver) = PendingRequirement::new::<T>(command, token.clone());
        *slot = Some(Slot { id, pending });
        drop(slot);

        self.log
            .event("Require", format_args!("{command} requires {requested}"));
        let guard = RequirementGuard {
            shared: Rc::clone(self),
            id,
        };
        Ok((guard, receiver))
    }

    pub(crate) fn notify_requirement(&self, tag: RequirementTag) {
        let notifier = Rc::clone(&self.notifier.borrow());
        notifier(tag);
    }

    pub(crate) fn outstanding_requirement(&self) -> Option<RequirementTag> {
        self.requirement
            .borrow()
            .as_ref()
            .filter(|slot| !slot.pending.is_cancelled())
            .map(|slot| slot.pending.tag())
    }

    pub(crate) fn clear_requirement(&self) {
        self.requirement.borrow_mut().take();
    }

    pub(crate) fn satisfy(&self, value: Box<dyn Any>, offered: RequirementTag) -> Satisfaction {
        let mut slot = self.requirement.borrow_mut();
        let Some(current) = slot.as_ref() else {
            self.log
                .event("Unexpected Satisfy", format_args!("nothing required"));
            return Satisfaction::NothingRequired;
        };
        if current.pending.is_cancelled() {
            self.log.event(
                "Unexpected Satisfy",
                format_args!("current requirement was cancelled"),
            );
            return Satisfaction::AlreadyCancelled;
        }
        let expected = current.pending.tag();
        if expected != offered {
            self.log.event(
                "Unexpected Satisfy",
                format_args!("expected {expected} but got {offered}"),
            );
            return Satisfaction::Mismatched {
                expected,
                actual: offered,
            };
        }

        let Some(Slot { pending, .. }) = slot.take() else {
            return Satisfaction::NothingRequired;
        };
        drop(slot);

        let command = pending.command();
        match pending.resolve(value) {
            Ok(()) => {
                self.log.event(
                    "Satisfy",
                    format_args!("{offered} was satisfied for {command}"),
                );
                Satisfaction::Fulfilled
            }
            Err(_) => {
                self.log.event(
                    "Unexpected Satisfy",
                    format_args!("{command} stopped waiting for {offered}"),
                );
                Satisfaction::AlreadyCancelled
            }
        }
    }

    fn release_requirement(&self, id: u64) {
        let mut slot = self.requirement.borrow_mut();
        if slot.as_ref().is_some_and(|s| s.id == id) {
            slot.take();
        }
    }
}

/// Clears the requirement slot when the waiting side goes away.
pub(crate) struct RequirementGuard {
    shared: Rc<RouterShared>,
    id: u64,
}

impl Drop for RequirementGuard {
    fn drop(&mut self) {
        self.shared.release_requirement(self.id);
    }
}
