//! Configuration for the `linkroute` binary.
//!
//! Values are layered by `ortho_config`: built-in defaults, then a TOML file
//! named by `--config-path` or `LINKROUTE_CONFIG_PATH`, then `LINKROUTE_*`
//! environment variables, then command-line flags. Later layers win.

mod defaults;
mod logging;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_DEDUPE_LINKS, DEFAULT_LOG_FILTER, DEFAULT_ROUTER_LOGGING, default_log_filter,
    default_log_filter_string, default_log_format,
};
pub use logging::{LogFormat, LogFormatParseError};

/// Resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "LINKROUTE")]
pub struct Config {
    /// `tracing` filter expression for the binary's log output.
    #[serde(default = "defaults::default_log_filter_string")]
    #[ortho_config(default = defaults::default_log_filter_string())]
    log_filter: String,

    /// Rendering of log events.
    #[serde(default)]
    #[ortho_config(default = defaults::default_log_format())]
    log_format: LogFormat,

    /// Emit router lifecycle events ("Execute Command", "Require", ...).
    #[serde(default)]
    #[ortho_config(default = false)]
    router_logging: bool,

    /// Suppress a link identical to the one routed last.
    #[serde(default = "defaults::default_dedupe_links")]
    #[ortho_config(default = true)]
    dedupe_links: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
            router_logging: DEFAULT_ROUTER_LOGGING,
            dedupe_links: DEFAULT_DEDUPE_LINKS,
        }
    }
}

impl Config {
    /// Log filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Log output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Whether router lifecycle events are logged.
    #[must_use]
    pub const fn router_logging(&self) -> bool {
        self.router_logging
    }

    /// Whether a repeated link is suppressed.
    #[must_use]
    pub const fn dedupe_links(&self) -> bool {
        self.dedupe_links
    }

    /// Returns a copy with a different log filter.
    #[must_use]
    pub fn with_log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = filter.into();
        self
    }

    /// Returns a copy with router lifecycle logging switched on or off.
    #[must_use]
    pub const fn with_router_logging(mut self, enabled: bool) -> Self {
        self.router_logging = enabled;
        self
    }
}
