//! Supervisory scopes bounding asynchronous work.
//!
//! A [`Supervisor`] pairs a cancellation token with a task tracker. The router
//! owns a root supervisor and hands each command a child, so cancelling the
//! router cancels every command and cancelling a command leaves its siblings
//! alone. Work spawned under a supervisor stops at its next suspension point
//! once the token is cancelled.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::error;

/// Tracing target for scope faults.
pub(crate) const SCOPE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::scope");

/// Cancellation and lifetime boundary for a tree of local tasks.
#[derive(Debug, Clone, Default)]
pub struct Supervisor {
    token: CancellationToken,
    tracker: TaskTracker,
}

impl Supervisor {
    /// Creates a root supervisor.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a supervisor cancelled whenever this one is.
    #[must_use]
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
            tracker: TaskTracker::new(),
        }
    }

    /// Spawns `work` onto the current [`LocalSet`](tokio::task::LocalSet).
    ///
    /// The task ends early when the supervisor is cancelled. A panic inside
    /// `work` is logged and cancels the supervisor.
    ///
    /// # Panics
    ///
    /// Panics when called outside a `LocalSet`.
    #[expect(
        clippy::must_use_candidate,
        reason = "dropping the handle detaches the task"
    )]
    pub fn spawn<F>(&self, work: F) -> JoinHandle<()>
    where
        F: Future<Output = ()> + 'static,
    {
        let token = self.token.clone();
        self.tracker.spawn_local(async move {
            tokio::select! {
                biased;
                () = token.cancelled() => {}
                outcome = AssertUnwindSafe(work).catch_unwind() => {
                    if let Err(panic) = outcome {
                        error!(
                            target: SCOPE_TARGET,
                            panic = panic_message(panic.as_ref()),
                            "supervised task panicked; cancelling scope"
                        );
                        token.cancel();
                    }
                }
            }
        })
    }

    /// Cancels this supervisor and every descendant.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Returns `true` once the supervisor has been cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves when the supervisor is cancelled.
    pub async fn cancelled(&self) {
        self.token.cancelled().await;
    }

    /// Number of spawned tasks still running.
    #[must_use]
    pub fn active_tasks(&self) -> usize {
        self.tracker.len()
    }

    /// Waits until every task spawned so far, and any they spawn in turn,
    /// has finished.
    pub async fn settled(&self) {
        self.tracker.close();
        self.tracker.wait().await;
    }

    pub(crate) fn token(&self) -> &CancellationToken {
        &self.token
    }
}

/// Extracts a printable message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&'static str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}
