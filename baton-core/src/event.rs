//! A ready-made event shape for proxied HTTP invocations.

use crate::message::{Message, Routable};
use std::collections::HashMap;

/// An HTTP request proxied into a function invocation.
///
/// Covers the fields a router needs; transports that deliver richer payloads
/// can implement [`Routable`] on their own types instead.
///
/// # Example
///
/// ```rust
/// use baton_core::{ProxyEvent, Routable};
///
/// let event = ProxyEvent::new("GET", "/users/42").with_header("accept", "text/plain");
/// assert_eq!(event.path(), "/users/42");
/// assert_eq!(event.header("accept"), Some("text/plain"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProxyEvent {
    /// HTTP method, e.g. `GET`.
    pub method: String,
    /// Request path, without the query string.
    pub path: String,
    /// Request headers.
    pub headers: HashMap<String, String>,
    /// Query string parameters.
    pub query: HashMap<String, String>,
    /// Raw request body, if any.
    pub body: Option<String>,
}

impl ProxyEvent {
    /// Create an event for the given method and path.
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            ..Self::default()
        }
    }

    /// Add a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Add a query string parameter.
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(name.into(), value.into());
        self
    }

    /// Set the body.
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Look up a header by name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }
}

impl Message for ProxyEvent {}

impl Routable for ProxyEvent {
    fn path(&self) -> &str {
        &self.path
    }
}
