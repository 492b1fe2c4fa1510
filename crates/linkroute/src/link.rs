//! Parsed URIs bound to commands.
//!
//! [`Link`] keeps the raw components the registry matches against and offers
//! the positional path-segment and named query-parameter projections that
//! commands read.

use std::fmt;
use std::str::FromStr;

use percent_encoding::percent_decode_str;
use url::Url;

/// A URI as seen by the router and by the command it is bound to.
///
/// Scheme, host and path are kept as written in the input: no case folding
/// and no `/` substituted for a missing path. Projections read the parsed
/// form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    url: Url,
    raw: RawComponents,
    segments: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct RawComponents {
    scheme: String,
    host: String,
    path: String,
}

impl RawComponents {
    /// Splits `input` into scheme, host and path without normalising them.
    fn split(input: &str) -> Self {
        let Some((scheme, rest)) = input.split_once(':') else {
            return Self::default();
        };
        let (host, tail) = match rest.strip_prefix("//") {
            Some(hierarchical) => {
                let end = hierarchical
                    .find(['/', '?', '#'])
                    .unwrap_or(hierarchical.len());
                let (authority, tail) = hierarchical
                    .split_at_checked(end)
                    .unwrap_or((hierarchical, ""));
                (authority_host(authority), tail)
            }
            None => ("", rest),
        };
        let path = tail.split(['?', '#']).next().unwrap_or_default();
        Self {
            scheme: scheme.to_owned(),
            host: host.to_owned(),
            path: path.to_owned(),
        }
    }
}

/// Host part of an authority, without user information or port.
fn authority_host(authority: &str) -> &str {
    let host_port = authority
        .rsplit_once('@')
        .map_or(authority, |(_, host_port)| host_port);
    if host_port.starts_with('[') {
        host_port.split_inclusive(']').next().unwrap_or(host_port)
    } else {
        host_port.split(':').next().unwrap_or(host_port)
    }
}

impl Link {
    /// Parses a URI string.
    ///
    /// # Errors
    ///
    /// Returns the parser error when `input` is not an absolute URI.
    pub fn parse(input: &str) -> Result<Self, url::ParseError> {
        let trimmed = input.trim_matches(|c: char| c.is_ascii_control() || c == ' ');
        let url = Url::parse(trimmed)?;
        Ok(Self::with_raw(url, RawComponents::split(trimmed)))
    }

    fn with_raw(url: Url, raw: RawComponents) -> Self {
        let segments = url
            .path_segments()
            .map(|segments| {
                segments
                    .filter(|segment| !segment.is_empty())
                    .map(|segment| percent_decode_str(segment).decode_utf8_lossy().into_owned())
                    .collect()
            })
            .unwrap_or_default();
        Self { url, raw, segments }
    }

    /// Scheme component as written.
    #[must_use]
    pub fn scheme(&self) -> &str {
        &self.raw.scheme
    }

    /// Host component as written, or the empty string when the URI has none.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.raw.host
    }

    /// Path component as written; empty when the URI has no path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.raw.path
    }

    /// Decoded, non-empty path segments.
    #[must_use]
    pub fn path_segments(&self) -> &[String] {
        &self.segments
    }

    /// Returns the path segment at `index`, or `None` when the path is
    /// shorter.
    #[must_use]
    pub fn path_segment(&self, index: usize) -> Option<&str> {
        self.segments.get(index).map(String::as_str)
    }

    /// Returns the first value of the query parameter `name`.
    #[must_use]
    pub fn query_param(&self, name: &str) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    }

    /// Underlying parsed URL.
    #[must_use]
    pub const fn as_url(&self) -> &Url {
        &self.url
    }
}

impl From<Url> for Link {
    fn from(url: Url) -> Self {
        let raw = RawComponents::split(url.as_str());
        Self::with_raw(url, raw)
    }
}

impl FromStr for Link {
    type Err = url::ParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        Self::parse(input)
    }
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.url, f)
    }
}
