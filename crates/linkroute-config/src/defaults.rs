//! Built-in configuration values.

use crate::logging::LogFormat;

/// Log filter applied when none is configured.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Whether repeated links are suppressed unless configured otherwise.
pub const DEFAULT_DEDUPE_LINKS: bool = true;

/// Whether router lifecycle events are logged unless configured otherwise.
pub const DEFAULT_ROUTER_LOGGING: bool = false;

/// Default log filter expression.
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned default log filter, for serde and `ortho_config` defaults.
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default log output format.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Json
}

pub(crate) const fn default_dedupe_links() -> bool {
    DEFAULT_DEDUPE_LINKS
}
