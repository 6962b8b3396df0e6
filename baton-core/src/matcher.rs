//! # Path Matcher Contract
//!
//! The dispatch engine never interprets route patterns itself. It hands a
//! [`RoutePattern`] and the request path to a [`PathMatcher`] and only relies
//! on three outcomes: a parameter map, "no match", or an invalid pattern.

use crate::error::MatchError;
use regex::Regex;
use std::{collections::HashMap, fmt, sync::Arc};

/// Parameters bound by a matching route pattern.
pub type Params = HashMap<String, String>;

/// A route pattern attached to a registration.
///
/// Patterns are stored as given; nothing is validated until a matcher sees
/// them during dispatch.
#[derive(Clone, Debug)]
pub enum RoutePattern {
    /// A path template such as `/users/:id` or `/static/*rest`.
    Path(Arc<str>),
    /// A raw regular expression. Named capture groups become params.
    Regex(Regex),
}

impl RoutePattern {
    /// Returns the pattern source.
    pub fn as_str(&self) -> &str {
        match self {
            RoutePattern::Path(path) => path,
            RoutePattern::Regex(regex) => regex.as_str(),
        }
    }
}

impl From<&str> for RoutePattern {
    fn from(pattern: &str) -> Self {
        RoutePattern::Path(Arc::from(pattern))
    }
}

impl From<String> for RoutePattern {
    fn from(pattern: String) -> Self {
        RoutePattern::Path(Arc::from(pattern))
    }
}

impl From<Regex> for RoutePattern {
    fn from(regex: Regex) -> Self {
        RoutePattern::Regex(regex)
    }
}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Matches route patterns against request paths.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot match route patterns",
    label = "missing `PathMatcher` implementation",
    note = "Implement `match_path` to plug a pattern syntax into the router."
)]
pub trait PathMatcher: Send + Sync + 'static {
    /// Matches `pattern` against `path`.
    ///
    /// Returns `Ok(Some(params))` on a match (the map may be empty),
    /// `Ok(None)` when the path does not match, and `Err` when the pattern
    /// itself is invalid.
    fn match_path(&self, pattern: &RoutePattern, path: &str)
    -> Result<Option<Params>, MatchError>;
}

impl<M: PathMatcher + ?Sized> PathMatcher for Arc<M> {
    fn match_path(
        &self,
        pattern: &RoutePattern,
        path: &str,
    ) -> Result<Option<Params>, MatchError> {
        (**self).match_path(pattern, path)
    }
}

impl<M: PathMatcher + ?Sized> PathMatcher for Box<M> {
    fn match_path(
        &self,
        pattern: &RoutePattern,
        path: &str,
    ) -> Result<Option<Params>, MatchError> {
        (**self).match_path(pattern, path)
    }
}

/// Matches a regular expression against `path`, collecting named groups.
///
/// Shared by matcher implementations that accept [`RoutePattern::Regex`].
pub fn match_regex(regex: &Regex, path: &str) -> Option<Params> {
    let captures = regex.captures(path)?;
    let params = regex
        .capture_names()
        .flatten()
        .filter_map(|name| {
            captures
                .name(name)
                .map(|value| (name.to_owned(), value.as_str().to_owned()))
        })
        .collect();
    Some(params)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regex_without_groups_matches_with_empty_params() {
        let regex = Regex::new(r"^/path").unwrap();
        assert_eq!(match_regex(&regex, "/path/a/b"), Some(Params::new()));
        assert_eq!(match_regex(&regex, "/notpath"), None);
    }

    #[test]
    fn test_regex_named_groups_become_params() {
        let regex = Regex::new(r"^/users/(?P<id>\d+)(?:/(?P<tab>\w+))?$").unwrap();
        let params = match_regex(&regex, "/users/42").unwrap();
        assert_eq!(params.get("id").map(String::as_str), Some("42"));
        assert!(!params.contains_key("tab"));
    }

    #[test]
    fn test_pattern_source() {
        assert_eq!(RoutePattern::from("/a/:b").as_str(), "/a/:b");
        let regex = RoutePattern::from(Regex::new("^/x").unwrap());
        assert_eq!(regex.to_string(), "^/x");
    }
}
