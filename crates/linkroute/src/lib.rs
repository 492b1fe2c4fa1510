//! URI command router.
//!
//! `linkroute` maps inbound links to short-lived commands. Links are matched
//! against registered [`RouteGroup`]s: the first group whose scheme and host
//! patterns accept the link is selected, and the first of its path routes
//! that matches the link's path names the [`Command`] to run.
//!
//! The [`Router`] runs at most one command at a time. A command does its
//! asynchronous work through its [`CommandScope`], which ties every spawned
//! task to a [`Supervisor`]; the router reports [`Outcome::Complete`] once all
//! of that work has settled, or [`Outcome::Cancelled`] when the command was
//! cancelled or faulted.
//!
//! # Requirements
//!
//! Command work can suspend on [`CommandScope::require`] until the host
//! supplies a value, such as the result of a login flow. The router tells the
//! host through its requirement listener and resumes the command when
//! [`Router::satisfy`] receives a value of the requested type. Only one
//! requirement may be outstanding at a time.
//!
//! # Example
//!
//! ```rust
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use linkroute::{Command, CommandScope, Outcome, RouteGroup, Router};
//!
//! struct OrderDetails;
//!
//! impl Command<Vec<String>> for OrderDetails {
//!     fn execute(&mut self, scope: &CommandScope<Vec<String>>) {
//!         let order = scope.path_segment(1).unwrap_or_default().to_owned();
//!         scope.navigate(move |screens| screens.push(format!("order {order}")));
//!     }
//! }
//!
//! let runtime = tokio::runtime::Builder::new_current_thread()
//!     .build()
//!     .expect("runtime");
//! let local = tokio::task::LocalSet::new();
//! local.block_on(&runtime, async {
//!     let mut router = Router::new();
//!     router
//!         .register(
//!             RouteGroup::builder()
//!                 .schemes(["https"])
//!                 .hosts(["example.com"])
//!                 .route("/orders/[a-zA-Z0-9]*", || OrderDetails)
//!                 .build()
//!                 .expect("patterns compile"),
//!         )
//!         .expect("group registers");
//!
//!     let outcome = Rc::new(RefCell::new(None));
//!     let slot = Rc::clone(&outcome);
//!     let routed = router
//!         .route("https://example.com/orders/abcd1234", move |result| {
//!             *slot.borrow_mut() = Some(result);
//!         })
//!         .expect("router idle");
//!     assert!(routed);
//!
//!     router.wait_idle().await;
//!     let mut screens = Vec::new();
//!     if let Some(Outcome::Complete(navigation)) = outcome.borrow_mut().take() {
//!         navigation.navigate(&mut screens);
//!     }
//!     assert_eq!(screens, ["order abcd1234"]);
//! });
//! ```

pub mod command;
pub mod controller;
pub mod error;
pub mod link;
pub mod registry;
pub mod requirement;
pub mod router;
pub mod scope;

#[cfg(test)]
mod tests;

pub use self::command::{Command, CommandScope, Navigation, Outcome};
pub use self::controller::{RouterController, RouterEvent};
pub use self::error::{RegistryError, RequireError, RouterError};
pub use self::link::Link;
pub use self::registry::{
    CommandFactory, NoMatch, Pattern, Registry, Route, RouteGroup, RouteGroupBuilder,
};
pub use self::requirement::{RequirementTag, Satisfaction};
pub use self::router::{RequirementNotifier, Router};
pub use self::scope::Supervisor;
