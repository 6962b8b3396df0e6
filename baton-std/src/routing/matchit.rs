//! Matchit-based path matcher.
//!
//! Accepts `:name` segments and `*name` catch-alls, rewriting them to
//! matchit's `{name}` / `{*name}` syntax; native matchit templates pass through
//! unchanged. The whole path has to match. Regex patterns are matched with
//! [`match_regex`].

use baton_core::{MatchError, Params, PathMatcher, RoutePattern, match_regex};
use matchit::Router as InnerRouter;
use std::{
    collections::HashMap,
    sync::{Arc, PoisonError, RwLock},
};

/// A [`PathMatcher`] backed by `matchit`.
///
/// Compiled patterns are cached, so each distinct pattern is parsed once per
/// matcher no matter how many dispatches use it.
#[derive(Default)]
pub struct MatchitMatcher {
    compiled: RwLock<HashMap<Arc<str>, Arc<InnerRouter<()>>>>,
}

impl MatchitMatcher {
    /// Create a matcher with an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    fn compiled(&self, pattern: &Arc<str>) -> Result<Arc<InnerRouter<()>>, MatchError> {
        if let Some(router) = self
            .compiled
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(pattern)
        {
            return Ok(Arc::clone(router));
        }

        let mut router = InnerRouter::new();
        router
            .insert(translate(pattern), ())
            .map_err(|e| MatchError::InvalidPattern {
                pattern: pattern.to_string(),
                reason: e.to_string(),
            })?;
        let router = Arc::new(router);

        self.compiled
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(Arc::clone(pattern), Arc::clone(&router));
        Ok(router)
    }
}

impl PathMatcher for MatchitMatcher {
    fn match_path(
        &self,
        pattern: &RoutePattern,
        path: &str,
    ) -> Result<Option<Params>, MatchError> {
        match pattern {
            RoutePattern::Path(template) => {
                let router = self.compiled(template)?;
                Ok(router.at(path).ok().map(|matched| {
                    matched
                        .params
                        .iter()
                        .map(|(name, value)| (name.to_owned(), value.to_owned()))
                        .collect()
                }))
            }
            RoutePattern::Regex(regex) => Ok(match_regex(regex, path)),
        }
    }
}

/// Rewrite `:name` and `*name` segments into matchit's template syntax.
pub fn translate(pattern: &str) -> String {
    pattern
        .split('/')
        .map(|segment| {
            if let Some(name) = segment.strip_prefix(':') {
                format!("{{{name}}}")
            } else if let Some(name) = segment.strip_prefix('*') {
                let name = if name.is_empty() { "rest" } else { name };
                format!("{{*{name}}}")
            } else {
                segment.to_owned()
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}
