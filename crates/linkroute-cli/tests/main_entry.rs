//! Integration tests for the `linkroute` binary entry point.

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::str::contains;

#[test]
fn home_link_prints_destination() {
    let mut command = cargo_bin_cmd!("linkroute");
    command.env("LINKROUTE_LOG_FILTER", "off");
    command.arg("https://example.com/home");
    command.assert().success().stdout("home\n");
}

#[test]
fn order_link_with_login_navigates() {
    let mut command = cargo_bin_cmd!("linkroute");
    command.env("LINKROUTE_LOG_FILTER", "off");
    command.args(["https://example.com/orders/abcd1234", "--login", "Ada"]);
    command
        .assert()
        .success()
        .stdout(contains("order abcd1234 for Ada"));
}

#[test]
fn unmatched_link_exits_with_failure() {
    let mut command = cargo_bin_cmd!("linkroute");
    command.env("LINKROUTE_LOG_FILTER", "off");
    command.arg("https://example.com/basket");
    command
        .assert()
        .code(1)
        .stderr(contains("no route matches"));
}

#[test]
fn invalid_log_filter_exits_with_error() {
    let mut command = cargo_bin_cmd!("linkroute");
    command.args(["--log-filter", "linkroute=loud", "https://example.com/home"]);
    command
        .assert()
        .code(2)
        .stderr(contains("invalid log filter"));
}
