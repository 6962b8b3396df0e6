//! The request view handed to every handler.

use crate::{
    matcher::Params,
    message::{Message, Routable},
};
use std::{collections::HashMap, fmt, sync::Arc};

/// Invocation metadata supplied alongside an event.
///
/// Defaults to an empty map when a dispatch does not provide one.
pub type Context = HashMap<String, String>;

/// The request a handler sees: the event, its context and any bound params.
///
/// Cloning is cheap; the event and context are shared. Each handler receives
/// a snapshot taken when it is invoked, so params bound by a later group are
/// visible to every handler that runs after the match.
pub struct Request<E> {
    event: Arc<E>,
    context: Arc<Context>,
    params: Option<Params>,
}

impl<E: Message> Request<E> {
    /// Create a request with no params bound.
    pub fn new(event: E, context: Context) -> Self {
        Self {
            event: Arc::new(event),
            context: Arc::new(context),
            params: None,
        }
    }
}

impl<E> Request<E> {
    /// The dispatched event.
    pub fn event(&self) -> &E {
        &self.event
    }

    /// The invocation context.
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Params bound by every pattern matched so far, or `None` if no route
    /// pattern has matched yet.
    pub fn params(&self) -> Option<&Params> {
        self.params.as_ref()
    }

    /// Look up a single bound param.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.as_ref()?.get(name).map(String::as_str)
    }

    /// Merges params from a matched pattern. Later matches overwrite earlier
    /// bindings of the same name.
    pub fn merge_params(&mut self, params: Params) {
        self.params.get_or_insert_with(Params::new).extend(params);
    }
}

impl<E: Routable> Request<E> {
    /// The path of the dispatched event.
    pub fn path(&self) -> &str {
        self.event.path()
    }
}

impl<E> Clone for Request<E> {
    fn clone(&self) -> Self {
        Self {
            event: Arc::clone(&self.event),
            context: Arc::clone(&self.context),
            params: self.params.clone(),
        }
    }
}

impl<E: fmt::Debug> fmt::Debug for Request<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("event", &self.event)
            .field("context", &self.context)
            .field("params", &self.params)
            .finish()
    }
}
