//! Requirements: pending requests for values supplied by the host.
//!
//! A command suspends on [`CommandScope::require`](crate::CommandScope::require)
//! and the router parks a [`PendingRequirement`] until the host calls
//! [`Router::satisfy`](crate::Router::satisfy) with a value whose type matches
//! the requirement's [`RequirementTag`].

use std::any::{Any, TypeId, type_name};
use std::fmt;

use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

/// Type descriptor attached to a requirement.
///
/// Two tags are equal when they describe the same Rust type.
#[derive(Clone, Copy)]
pub struct RequirementTag {
    id: TypeId,
    name: &'static str,
}

impl RequirementTag {
    /// Returns the tag describing `T`.
    #[must_use]
    pub fn of<T: Any>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    /// Returns `true` when this tag describes `T`.
    #[must_use]
    pub fn is<T: Any>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }

    /// Fully qualified type name of the described type.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.name
    }

    /// Unqualified type name, used in log lines.
    #[must_use]
    pub fn short_name(&self) -> &'static str {
        short_type_name(self.name)
    }
}

impl PartialEq for RequirementTag {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for RequirementTag {}

impl fmt::Debug for RequirementTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RequirementTag").field(&self.name).finish()
    }
}

impl fmt::Display for RequirementTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// Result of offering a value to the router.
///
/// Only [`Satisfaction::Fulfilled`] changes router state; every other
/// variant is logged and ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Satisfaction {
    /// The outstanding requirement was resolved with the value.
    Fulfilled,
    /// No requirement was outstanding.
    NothingRequired,
    /// The outstanding requirement belongs to a cancelled command.
    AlreadyCancelled,
    /// The value's type does not match the outstanding requirement.
    Mismatched {
        /// Type the requirement expects.
        expected: RequirementTag,
        /// Type that was offered.
        actual: RequirementTag,
    },
}

impl Satisfaction {
    /// Returns `true` when the value resolved a requirement.
    #[must_use]
    pub const fn is_fulfilled(&self) -> bool {
        matches!(self, Self::Fulfilled)
    }
}

type Resolver = Box<dyn FnOnce(Box<dyn Any>) -> Result<(), Box<dyn Any>>>;

/// The router's record of a suspended command.
pub(crate) struct PendingRequirement {
    command: &'static str,
    tag: RequirementTag,
    token: CancellationToken,
    resolve: Resolver,
}

impl PendingRequirement {
    /// Creates the record and the receiver the requesting command awaits.
    pub(crate) fn new<T: Any>(
        command: &'static str,
        token: CancellationToken,
    ) -> (Self, oneshot::Receiver<T>) {
        let (sender, receiver) = oneshot::channel::<T>();
        let resolve: Resolver = Box::new(move |value: Box<dyn Any>| -> Result<(), Box<dyn Any>> {
            let typed = value.downcast::<T>()?;
            sender
                .send(*typed)
                .map_err(|unsent| Box::new(unsent) as Box<dyn Any>)
        });
        let pending = Self {
            command,
            tag: RequirementTag::of::<T>(),
            token,
            resolve,
        };
        (pending, receiver)
    }

    pub(crate) const fn tag(&self) -> RequirementTag {
        self.tag
    }

    pub(crate) const fn command(&self) -> &'static str {
        self.command
    }

    /// A requirement is stale once its command scope has been cancelled.
    pub(crate) fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Hands the value to the waiting command.
    ///
    /// Returns the value back when the waiting side has gone away.
    pub(crate) fn resolve(self, value: Box<dyn Any>) -> Result<(), Box<dyn Any>> {
        (self.resolve)(value)
    }
}

impl fmt::Debug for PendingRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingRequirement")
            .field("command", &self.command)
            .field("tag", &self.tag)
            .field("cancelled", &self.is_cancelled())
            .finish_non_exhaustive()
    }
}

/// Strips module paths from a type name, keeping generic arguments readable.
pub(crate) fn short_type_name(name: &'static str) -> &'static str {
    let head = name.split('<').next().unwrap_or(name);
    match head.rfind("::") {
        Some(index) => name.get(index + 2..).unwrap_or(name),
        None => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct LoginResult;

    #[test]
    fn tags_compare_by_type() {
        assert_eq!(RequirementTag::of::<String>(), RequirementTag::of::<String>());
        assert_ne!(RequirementTag::of::<String>(), RequirementTag::of::<&str>());
        assert!(RequirementTag::of::<LoginResult>().is::<LoginResult>());
    }

    #[test]
    fn display_uses_short_name() {
        let tag = RequirementTag::of::<LoginResult>();
        assert_eq!(tag.to_string(), "LoginResult");
        assert!(tag.type_name().ends_with("tests::LoginResult"));
    }

    #[test]
    fn short_name_keeps_generic_arguments() {
        assert_eq!(short_type_name("alloc::vec::Vec<u8>"), "Vec<u8>");
        assert_eq!(short_type_name("u32"), "u32");
    }

    #[test]
    fn resolve_delivers_value_to_receiver() {
        let (pending, mut receiver) =
            PendingRequirement::new::<String>("Lookup", CancellationToken::new());
        pending
            .resolve(Box::new(String::from("ada")))
            .expect("receiver is alive");
        assert_eq!(receiver.try_recv().expect("value delivered"), "ada");
    }

    #[test]
    fn resolve_returns_value_when_receiver_dropped() {
        let (pending, receiver) =
            PendingRequirement::new::<u32>("Lookup", CancellationToken::new());
        drop(receiver);
        let returned = pending.resolve(Box::new(7_u32)).expect_err("receiver gone");
        assert_eq!(returned.downcast_ref::<u32>(), Some(&7));
    }

    #[test]
    fn cancellation_follows_command_token() {
        let token = CancellationToken::new();
        let (pending, _receiver) = PendingRequirement::new::<u32>("Lookup", token.clone());
        assert!(!pending.is_cancelled());
        token.cancel();
        assert!(pending.is_cancelled());
    }
}
