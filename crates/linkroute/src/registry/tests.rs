//! Tests for pattern groups and link resolution.

use rstest::{fixture, rstest};

use super::*;
use crate::command::CommandScope;

struct Home;

impl Command<()> for Home {
    fn execute(&mut self, _scope: &CommandScope<()>) {}
}

struct Orders;

impl Command<()> for Orders {
    fn execute(&mut self, _scope: &CommandScope<()>) {}
}

struct Fallback;

impl Command<()> for Fallback {
    fn execute(&mut self, _scope: &CommandScope<()>) {}
}

fn link(input: &str) -> Link {
    Link::parse(input).expect("valid test uri")
}

fn resolved_name(registry: &Registry<()>, input: &str) -> Result<&'static str, NoMatch> {
    registry
        .resolve(&link(input))
        .map(|route| route.create_command().name())
}

#[fixture]
fn shop() -> Registry<()> {
    let mut registry = Registry::new();
    registry
        .register(
            RouteGroup::builder()
                .schemes(["https"])
                .hosts(["example.com"])
                .route("/home", || Home)
                .route("/orders/[a-zA-Z0-9]*", || Orders)
                .build()
                .expect("patterns compile"),
        )
        .expect("group registers");
    registry
}

#[rstest]
#[case::home("https://example.com/home", Ok("Home"))]
#[case::order("https://example.com/orders/abcd1234", Ok("Orders"))]
#[case::empty_order_id("https://example.com/orders/", Ok("Orders"))]
#[case::unknown_path("https://example.com/basket", Err(NoMatch::Path { group: 0 }))]
#[case::wrong_scheme("http://example.com/home", Err(NoMatch::SchemeOrHost))]
#[case::wrong_host("https://example.org/home", Err(NoMatch::SchemeOrHost))]
#[case::upper_case_path("https://example.com/HOME", Err(NoMatch::Path { group: 0 }))]
#[case::prefix_is_not_enough("https://example.com/home/extra", Err(NoMatch::Path { group: 0 }))]
#[case::punctuation_in_id("https://example.com/orders/ab-cd", Err(NoMatch::Path { group: 0 }))]
#[case::mixed_case_host("https://Example.COM/home", Err(NoMatch::SchemeOrHost))]
#[case::upper_case_scheme("HTTPS://example.com/home", Err(NoMatch::SchemeOrHost))]
fn resolves_against_shop_group(
    shop: Registry<()>,
    #[case] input: &str,
    #[case] expected: Result<&'static str, NoMatch>,
) {
    assert_eq!(resolved_name(&shop, input), expected);
}

#[test]
fn first_accepting_group_wins_without_fallback() {
    let mut registry = Registry::new();
    registry
        .register(
            RouteGroup::builder()
                .schemes(["https"])
                .hosts([".*"])
                .route("/home", || Home)
                .build()
                .expect("patterns compile"),
        )
        .expect("first group registers");
    registry
        .register(
            RouteGroup::builder()
                .schemes(["https"])
                .hosts(["example.com"])
                .route("/orders/.*", || Orders)
                .build()
                .expect("patterns compile"),
        )
        .expect("second group registers");

    assert_eq!(
        resolved_name(&registry, "https://example.com/orders/1"),
        Err(NoMatch::Path { group: 0 })
    );
    assert_eq!(
        resolved_name(&registry, "https://example.com/home"),
        Ok("Home")
    );
}

#[test]
fn first_matching_route_in_group_wins() {
    let mut registry = Registry::new();
    registry
        .register(
            RouteGroup::builder()
                .schemes(["https"])
                .hosts(["example.com"])
                .route("/.*", || Fallback)
                .route("/home", || Home)
                .build()
                .expect("patterns compile"),
        )
        .expect("group registers");

    assert_eq!(
        resolved_name(&registry, "https://example.com/home"),
        Ok("Fallback")
    );
}

#[test]
fn any_scheme_or_host_pattern_may_accept() {
    let mut registry = Registry::new();
    registry
        .register(
            RouteGroup::builder()
                .schemes(["http", "https"])
                .hosts(["example.com", "www\\.example\\.com"])
                .route("/home", || Home)
                .build()
                .expect("patterns compile"),
        )
        .expect("group registers");

    for input in [
        "http://example.com/home",
        "https://www.example.com/home",
    ] {
        assert_eq!(resolved_name(&registry, input), Ok("Home"), "{input}");
    }
}

#[test]
fn empty_registry_matches_nothing() {
    let registry: Registry<()> = Registry::new();
    assert!(registry.is_empty());
    assert_eq!(
        resolved_name(&registry, "https://example.com/home"),
        Err(NoMatch::SchemeOrHost)
    );
}

#[rstest]
#[case::no_schemes(Vec::new(), vec!["example.com"])]
#[case::no_hosts(vec!["https"], Vec::new())]
fn groups_that_can_never_match_are_rejected(
    #[case] schemes: Vec<&str>,
    #[case] hosts: Vec<&str>,
) {
    let group = RouteGroup::<()>::builder()
        .schemes(schemes.clone())
        .hosts(hosts)
        .route("/home", || Home)
        .build()
        .expect("patterns compile");
    let error = Registry::new()
        .register(group)
        .expect_err("registration must fail");
    if schemes.is_empty() {
        assert!(matches!(error, RegistryError::MissingSchemes));
    } else {
        assert!(matches!(error, RegistryError::MissingHosts));
    }
}

#[test]
fn invalid_pattern_is_reported_with_its_text() {
    let error = RouteGroup::<()>::builder()
        .schemes(["https"])
        .hosts(["example.com"])
        .route("/orders/[", || Orders)
        .build()
        .expect_err("pattern must not compile");
    match error {
        RegistryError::InvalidPattern { pattern, .. } => assert_eq!(pattern, "/orders/["),
        other => panic!("unexpected error: {other}"),
    }
}

#[rstest]
fn extend_group_appends_routes_after_existing_ones(mut shop: Registry<()>) {
    shop.extend_group(
        0,
        RouteGroup::builder()
            .route("/home", || Fallback)
            .route("/basket", || Fallback)
            .build()
            .expect("patterns compile"),
    )
    .expect("group exists");

    assert_eq!(shop.len(), 1);
    let group = shop.groups().first().expect("group registered");
    assert_eq!(group.routes().len(), 4);
    assert_eq!(resolved_name(&shop, "https://example.com/home"), Ok("Home"));
    assert_eq!(
        resolved_name(&shop, "https://example.com/basket"),
        Ok("Fallback")
    );
}

#[rstest]
fn extend_group_rejects_unknown_index(mut shop: Registry<()>) {
    let error = shop
        .extend_group(3, RouteGroup::builder().build().expect("empty group builds"))
        .expect_err("index 3 is unknown");
    assert!(matches!(error, RegistryError::UnknownGroup { index: 3 }));
}

#[test]
fn route_all_maps_every_path_to_one_command() {
    let mut registry = Registry::new();
    registry
        .register(
            RouteGroup::builder()
                .schemes(["https"])
                .hosts(["example.com"])
                .route_all(["/home", "/start", ""], || Home)
                .build()
                .expect("patterns compile"),
        )
        .expect("group registers");

    let group = registry.groups().first().expect("group registered");
    let paths: Vec<_> = group
        .routes()
        .iter()
        .map(|route| route.pattern().as_str())
        .collect();
    assert_eq!(paths, ["/home", "/start", ""]);
    for input in [
        "https://example.com/home",
        "https://example.com/start",
        "https://example.com",
    ] {
        assert_eq!(resolved_name(&registry, input), Ok("Home"), "{input}");
    }
}

#[rstest]
#[case::no_path("https://example.com", Ok("Home"))]
#[case::root_path("https://example.com/", Ok("Fallback"))]
#[case::query_only("https://example.com?ref=mail", Ok("Home"))]
fn missing_path_matches_as_empty_string(
    #[case] input: &str,
    #[case] expected: Result<&'static str, NoMatch>,
) {
    let mut registry = Registry::new();
    registry
        .register(
            RouteGroup::builder()
                .schemes(["https"])
                .hosts(["example.com"])
                .route("", || Home)
                .route("/", || Fallback)
                .build()
                .expect("patterns compile"),
        )
        .expect("group registers");

    assert_eq!(resolved_name(&registry, input), expected);
}

#[test]
fn each_resolution_creates_a_fresh_command() {
    use std::cell::Cell;
    use std::rc::Rc;

    let created = Rc::new(Cell::new(0));
    let counter = Rc::clone(&created);
    let group = RouteGroup::<()>::builder()
        .schemes(["https"])
        .hosts(["example.com"])
        .route("/home", move || {
            counter.set(counter.get() + 1);
            Home
        })
        .build()
        .expect("patterns compile");
    let mut registry = Registry::new();
    registry.register(group).expect("group registers");

    let route = registry
        .resolve(&link("https://example.com/home"))
        .expect("route resolves");
    drop(route.create_command());
    drop(route.create_command());
    assert_eq!(created.get(), 2);
}

#[rstest]
#[case::alternation("https|app", "app", true)]
#[case::partial_scheme("http", "https", false)]
#[case::anchored_alternation("a|b", "ab", false)]
#[case::case_sensitive("Example", "example", false)]
fn patterns_match_whole_components(
    #[case] source: &str,
    #[case] component: &str,
    #[case] expected: bool,
) {
    let pattern = Pattern::new(source).expect("pattern compiles");
    assert_eq!(pattern.matches(component), expected);
}
