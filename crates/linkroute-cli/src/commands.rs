//! The route table the binary serves, and the screens it navigates to.

use std::fmt;

use linkroute::{Command, CommandScope, RouteGroup, Router, RouterError};
use tracing::debug;

const COMMANDS_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::commands");

/// A destination the host can show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Screen {
    Home,
    OrderDetails { order_id: String, user: String },
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Home => f.write_str("home"),
            Self::OrderDetails { order_id, user } => write!(f, "order {order_id} for {user}"),
        }
    }
}

/// Navigation context handed to completed commands.
#[derive(Debug, Default)]
pub(crate) struct Navigator {
    history: Vec<Screen>,
}

impl Navigator {
    pub(crate) fn open(&mut self, screen: Screen) {
        self.history.push(screen);
    }

    pub(crate) fn current(&self) -> Option<&Screen> {
        self.history.last()
    }
}

/// Value an order command waits for before it can show the order.
#[derive(Debug, Clone)]
pub(crate) struct LoginResult {
    pub(crate) name: String,
}

pub(crate) struct HomeCommand;

impl Command<Navigator> for HomeCommand {
    fn execute(&mut self, scope: &CommandScope<Navigator>) {
        scope.navigate(|navigator| navigator.open(Screen::Home));
    }
}

pub(crate) struct OrderDetailsCommand;

impl Command<Navigator> for OrderDetailsCommand {
    fn execute(&mut self, scope: &CommandScope<Navigator>) {
        let order_id = scope.path_segment(1).unwrap_or_default().to_owned();
        let work = scope.clone();
        scope.spawn(async move {
            match work.require::<LoginResult>().await {
                Ok(login) => work.navigate(move |navigator| {
                    navigator.open(Screen::OrderDetails {
                        order_id,
                        user: login.name,
                    });
                }),
                Err(error) => debug!(target: COMMANDS_TARGET, %error, "order details abandoned"),
            }
        });
    }
}

/// Builds a router serving `https://example.com`.
pub(crate) fn sample_router() -> Result<Router<Navigator>, RouterError> {
    let mut router = Router::new();
    router.register(
        RouteGroup::builder()
            .schemes(["https"])
            .hosts(["example.com"])
            .route("/home", || HomeCommand)
            .route("/orders/[a-zA-Z0-9]*", || OrderDetailsCommand)
            .build()?,
    )?;
    Ok(router)
}
