//! Pattern group registry.
//!
//! A [`RouteGroup`] pairs scheme and host patterns with an ordered list of
//! path routes. The [`Registry`] keeps groups in registration order and
//! resolves a [`Link`] to the first matching route:
//!
//! 1. the first group with a matching scheme pattern *and* a matching host
//!    pattern is selected;
//! 2. within that group the first route whose path pattern matches wins;
//! 3. there is no fallback to later groups when the path does not match.
//!
//! All patterns are regular expressions matched against the whole component,
//! case-sensitively.

use std::fmt;

use regex::Regex;

use crate::command::Command;
use crate::error::RegistryError;
use crate::link::Link;

/// Creates a fresh command for every routed link.
pub type CommandFactory<C> = Box<dyn Fn() -> Box<dyn Command<C>>>;

/// A regular expression that must match a whole URI component.
#[derive(Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    /// Compiles `source` so that it only matches complete components.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidPattern`] when `source` is not a valid
    /// regular expression.
    pub fn new(source: impl Into<String>) -> Result<Self, RegistryError> {
        let text: String = source.into();
        match Regex::new(&format!("^(?:{text})$")) {
            Ok(regex) => Ok(Self {
                source: text,
                regex,
            }),
            Err(error) => Err(RegistryError::invalid_pattern(text, error)),
        }
    }

    /// Returns `true` when the whole of `component` matches.
    #[must_use]
    pub fn matches(&self, component: &str) -> bool {
        self.regex.is_match(component)
    }

    /// Pattern text as supplied at registration.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pattern").field(&self.source).finish()
    }
}

/// A path pattern and the factory for the command it dispatches to.
pub struct Route<C> {
    pattern: Pattern,
    factory: CommandFactory<C>,
}

impl<C> Route<C> {
    /// Path pattern of this route.
    #[must_use]
    pub const fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// Builds a new command instance.
    #[must_use]
    pub fn create_command(&self) -> Box<dyn Command<C>> {
        (self.factory)()
    }
}

impl<C> fmt::Debug for Route<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("pattern", &self.pattern)
            .finish_non_exhaustive()
    }
}

/// Scheme and host patterns sharing a list of path routes.
pub struct RouteGroup<C> {
    schemes: Vec<Pattern>,
    hosts: Vec<Pattern>,
    routes: Vec<Route<C>>,
}

impl<C: 'static> RouteGroup<C> {
    /// Starts describing a group.
    #[must_use]
    pub fn builder() -> RouteGroupBuilder<C> {
        RouteGroupBuilder::default()
    }
}

impl<C> RouteGroup<C> {
    /// Scheme patterns, any of which may match.
    #[must_use]
    pub fn schemes(&self) -> &[Pattern] {
        &self.schemes
    }

    /// Host patterns, any of which may match.
    #[must_use]
    pub fn hosts(&self) -> &[Pattern] {
        &self.hosts
    }

    /// Path routes in registration order.
    #[must_use]
    pub fn routes(&self) -> &[Route<C>] {
        &self.routes
    }

    fn accepts(&self, link: &Link) -> bool {
        self.schemes.iter().any(|p| p.matches(link.scheme()))
            && self.hosts.iter().any(|p| p.matches(link.host()))
    }

    fn find_route(&self, path: &str) -> Option<&Route<C>> {
        self.routes.iter().find(|route| route.pattern.matches(path))
    }

    fn validate(&self) -> Result<(), RegistryError> {
        if self.schemes.is_empty() {
            return Err(RegistryError::MissingSchemes);
        }
        if self.hosts.is_empty() {
            return Err(RegistryError::MissingHosts);
        }
        Ok(())
    }
}

impl<C> fmt::Debug for RouteGroup<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteGroup")
            .field("schemes", &self.schemes)
            .field("hosts", &self.hosts)
            .field("routes", &self.routes)
            .finish()
    }
}

/// Collects patterns and routes before compiling them into a [`RouteGroup`].
///
/// ```
/// use linkroute::{Command, CommandScope, RouteGroup};
///
/// struct Home;
///
/// impl Command<()> for Home {
///     fn execute(&mut self, _scope: &CommandScope<()>) {}
/// }
///
/// let group = RouteGroup::<()>::builder()
///     .schemes(["https"])
///     .hosts(["example.com"])
///     .route("/home", || Home)
///     .build()
///     .expect("patterns compile");
/// assert_eq!(group.routes().len(), 1);
/// ```
pub struct RouteGroupBuilder<C> {
    schemes: Vec<String>,
    hosts: Vec<String>,
    routes: Vec<(String, CommandFactory<C>)>,
}

impl<C> Default for RouteGroupBuilder<C> {
    fn default() -> Self {
        Self {
            schemes: Vec::new(),
            hosts: Vec::new(),
            routes: Vec::new(),
        }
    }
}

impl<C: 'static> RouteGroupBuilder<C> {
    /// Adds scheme patterns.
    #[must_use]
    pub fn schemes<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.schemes.extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Adds host patterns.
    #[must_use]
    pub fn hosts<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hosts.extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Maps a path pattern to a command factory.
    #[must_use]
    pub fn route<F, K>(mut self, path: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> K + 'static,
        K: Command<C> + 'static,
    {
        self.routes.push((path.into(), boxed_factory(factory)));
        self
    }

    /// Maps several path patterns to the same command factory.
    #[must_use]
    pub fn route_all<I, S, F, K>(mut self, paths: I, factory: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn() -> K + Clone + 'static,
        K: Command<C> + 'static,
    {
        for path in paths {
            self.routes
                .push((path.into(), boxed_factory(factory.clone())));
        }
        self
    }

    /// Compiles every pattern.
    ///
    /// Emptiness of the scheme and host sets is checked at registration, not
    /// here.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidPattern`] for the first pattern that
    /// fails to compile.
    pub fn build(self) -> Result<RouteGroup<C>, RegistryError> {
        let schemes = compile_all(self.schemes)?;
        let hosts = compile_all(self.hosts)?;
        let routes = compile_routes(self.routes)?;
        Ok(RouteGroup {
            schemes,
            hosts,
            routes,
        })
    }
}

fn boxed_factory<C, F, K>(factory: F) -> CommandFactory<C>
where
    F: Fn() -> K + 'static,
    K: Command<C> + 'static,
{
    Box::new(move || Box::new(factory()) as Box<dyn Command<C>>)
}

fn compile_all(sources: Vec<String>) -> Result<Vec<Pattern>, RegistryError> {
    sources.into_iter().map(Pattern::new).collect()
}

fn compile_routes<C>(
    routes: Vec<(String, CommandFactory<C>)>,
) -> Result<Vec<Route<C>>, RegistryError> {
    routes
        .into_iter()
        .map(|(path, factory)| {
            Pattern::new(path).map(|pattern| Route { pattern, factory })
        })
        .collect()
}

/// Why a link did not resolve to a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoMatch {
    /// No group accepts the link's scheme and host.
    SchemeOrHost,
    /// The selected group has no route for the link's path.
    Path {
        /// Index of the group that accepted the scheme and host.
        group: usize,
    },
}

impl fmt::Display for NoMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SchemeOrHost => f.write_str("no matching scheme or host"),
            Self::Path { group } => write!(f, "no command mapped in group {group}"),
        }
    }
}

/// Ordered collection of route groups.
pub struct Registry<C> {
    groups: Vec<RouteGroup<C>>,
}

impl<C> Default for Registry<C> {
    fn default() -> Self {
        Self { groups: Vec::new() }
    }
}

impl<C> Registry<C> {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a group after the groups already registered.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::MissingSchemes`] or
    /// [`RegistryError::MissingHosts`] when the group could never match.
    pub fn register(&mut self, group: RouteGroup<C>) -> Result<usize, RegistryError> {
        group.validate()?;
        self.groups.push(group);
        Ok(self.groups.len() - 1)
    }

    /// Appends the routes of `extension` to the group at `index`.
    ///
    /// Scheme and host patterns carried by `extension` are appended too.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownGroup`] when no group exists at
    /// `index`.
    pub fn extend_group(
        &mut self,
        index: usize,
        extension: RouteGroup<C>,
    ) -> Result<(), RegistryError> {
        let group = self
            .groups
            .get_mut(index)
            .ok_or(RegistryError::unknown_group(index))?;
        group.schemes.extend(extension.schemes);
        group.hosts.extend(extension.hosts);
        group.routes.extend(extension.routes);
        Ok(())
    }

    /// Resolves `link` to a route.
    ///
    /// # Errors
    ///
    /// Returns [`NoMatch`] describing which stage failed.
    pub fn resolve(&self, link: &Link) -> Result<&Route<C>, NoMatch> {
        let (index, group) = self
            .groups
            .iter()
            .enumerate()
            .find(|(_, group)| group.accepts(link))
            .ok_or(NoMatch::SchemeOrHost)?;
        group
            .find_route(link.path())
            .ok_or(NoMatch::Path { group: index })
    }

    /// Registered groups in order.
    #[must_use]
    pub fn groups(&self) -> &[RouteGroup<C>] {
        &self.groups
    }

    /// Number of registered groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Returns `true` when no group is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl<C> fmt::Debug for Registry<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("groups", &self.groups)
            .finish()
    }
}

#[cfg(test)]
mod tests;
