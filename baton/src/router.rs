//! # Middleware Registry
//!
//! A [`Router`] is an ordered list of entries, one per registration call.
//! Each entry carries an optional [`RoutePattern`] and the units passed to
//! that call: handlers and nested routers, in the order given. Registration
//! order is dispatch order.
//!
//! A `Router` is a handle. Clones share one registry, so a router mounted
//! into a parent keeps seeing registrations made on it afterwards, and the
//! same router can be mounted under several parents. Dispatch never mutates
//! any registry; it works on its own queue derived from a snapshot.

use crate::dispatch::Dispatch;
use baton_core::{
    Callback, Context, Error, Handler, Message, PathMatcher, Reply, Request, Routable,
    RoutePattern,
};
use std::{
    fmt,
    sync::{Arc, PoisonError, RwLock},
};

#[cfg(feature = "timeout")]
use baton_core::DispatchError;
#[cfg(feature = "timeout")]
use std::time::Duration;

/// A unit passed to a registration call.
pub enum Unit<E> {
    /// A single handler.
    Handler(Handler<E>),
    /// A nested router, expanded in place at dispatch time.
    Mount(Router<E>),
}

impl<E> Clone for Unit<E> {
    fn clone(&self) -> Self {
        match self {
            Unit::Handler(handler) => Unit::Handler(handler.clone()),
            Unit::Mount(router) => Unit::Mount(router.clone()),
        }
    }
}

impl<E> fmt::Debug for Unit<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unit::Handler(handler) => fmt::Debug::fmt(handler, f),
            Unit::Mount(router) => f.debug_tuple("Unit::Mount").field(router).finish(),
        }
    }
}

impl<E> From<Handler<E>> for Unit<E> {
    fn from(handler: Handler<E>) -> Self {
        Unit::Handler(handler)
    }
}

impl<E> From<Router<E>> for Unit<E> {
    fn from(router: Router<E>) -> Self {
        Unit::Mount(router)
    }
}

impl<E> From<&Router<E>> for Unit<E> {
    fn from(router: &Router<E>) -> Self {
        Unit::Mount(router.clone())
    }
}

/// The record of one registration call.
pub(crate) struct Entry<E> {
    pub(crate) pattern: Option<RoutePattern>,
    pub(crate) units: Arc<[Unit<E>]>,
}

impl<E> Clone for Entry<E> {
    fn clone(&self) -> Self {
        Self {
            pattern: self.pattern.clone(),
            units: Arc::clone(&self.units),
        }
    }
}

struct Inner<E> {
    entries: RwLock<Vec<Entry<E>>>,
    matcher: Arc<dyn PathMatcher>,
}

/// An ordered registry of handlers and nested routers.
///
/// # Example
///
/// ```rust
/// use baton::{Flow, Router, middleware};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let router = Router::<&'static str>::new();
/// router.register_at(
///     "/hello/:name",
///     [middleware(|req, res| async move {
///         let name = req.param("name").unwrap_or("stranger").to_owned();
///         res.send(format!("Hello, {name}"))?;
///         Ok(Flow::Halt)
///     })],
/// );
///
/// let reply = router.dispatch("/hello/ferris").await.unwrap().unwrap();
/// assert_eq!(reply.body, "Hello, ferris");
/// # }
/// ```
pub struct Router<E> {
    inner: Arc<Inner<E>>,
}

impl<E> Clone for Router<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[cfg(feature = "matchit")]
impl<E: Message> Default for Router<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Message> Router<E> {
    /// Create an empty router using [`MatchitMatcher`].
    ///
    /// [`MatchitMatcher`]: baton_std::routing::MatchitMatcher
    #[cfg(feature = "matchit")]
    pub fn new() -> Self {
        Self::with_matcher(baton_std::routing::MatchitMatcher::new())
    }

    /// Create an empty router that matches route patterns with `matcher`.
    ///
    /// The matcher of the router a dispatch starts on is used for every
    /// pattern that dispatch meets, including those of mounted routers.
    pub fn with_matcher<M: PathMatcher>(matcher: M) -> Self {
        Self {
            inner: Arc::new(Inner {
                entries: RwLock::new(Vec::new()),
                matcher: Arc::new(matcher),
            }),
        }
    }

    fn push<I>(&self, pattern: Option<RoutePattern>, units: I) -> &Self
    where
        I: IntoIterator,
        I::Item: Into<Unit<E>>,
    {
        let units: Arc<[Unit<E>]> = units.into_iter().map(Into::into).collect();
        self.inner
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Entry { pattern, units });
        self
    }

    /// Register units that run for every path.
    pub fn register<I>(&self, units: I) -> &Self
    where
        I: IntoIterator,
        I::Item: Into<Unit<E>>,
    {
        self.push(None, units)
    }

    /// Register units that only run when `pattern` matches the request path.
    ///
    /// The pattern gates the whole registration: when it does not match,
    /// none of the units run. It is not validated here; an invalid pattern
    /// surfaces as an error when a dispatch reaches it.
    pub fn register_at<P, I>(&self, pattern: P, units: I) -> &Self
    where
        P: Into<RoutePattern>,
        I: IntoIterator,
        I::Item: Into<Unit<E>>,
    {
        self.push(Some(pattern.into()), units)
    }

    /// Builder-style [`register`](Self::register).
    pub fn with<I>(self, units: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Unit<E>>,
    {
        self.register(units);
        self
    }

    /// Builder-style [`register_at`](Self::register_at).
    pub fn with_at<P, I>(self, pattern: P, units: I) -> Self
    where
        P: Into<RoutePattern>,
        I: IntoIterator,
        I::Item: Into<Unit<E>>,
    {
        self.register_at(pattern, units);
        self
    }

    /// Mount a nested router for every path.
    pub fn mount(&self, router: &Router<E>) -> &Self {
        self.register([router])
    }

    /// Mount a nested router under `pattern`.
    pub fn mount_at<P: Into<RoutePattern>>(&self, pattern: P, router: &Router<E>) -> &Self {
        self.register_at(pattern, [router])
    }

    /// Number of registration calls recorded.
    pub fn len(&self) -> usize {
        self.read_entries().len()
    }

    /// Whether nothing has been registered.
    pub fn is_empty(&self) -> bool {
        self.read_entries().is_empty()
    }
}

impl<E> Router<E> {
    fn read_entries(&self) -> std::sync::RwLockReadGuard<'_, Vec<Entry<E>>> {
        self.inner
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// A snapshot of the entries; handlers and nested routers are shared.
    pub(crate) fn entries(&self) -> Vec<Entry<E>> {
        self.read_entries().clone()
    }

    /// The matcher used for dispatches started on this router.
    pub fn matcher(&self) -> &Arc<dyn PathMatcher> {
        &self.inner.matcher
    }

    /// Whether both handles share one registry.
    pub(crate) fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<E: Routable> Router<E> {
    /// Dispatch `event` with an empty context.
    ///
    /// The returned future resolves to `Ok(Some(reply))` once a handler
    /// sends, `Err(error)` once a handler calls `error` or an error reaches
    /// the end of the chain, and `Ok(None)` if the chain ends without either.
    pub fn dispatch(&self, event: E) -> Dispatch {
        self.start(event, Context::new(), None)
    }

    /// Dispatch `event` with an invocation context.
    pub fn dispatch_with(&self, event: E, context: Context) -> Dispatch {
        self.start(event, context, None)
    }

    /// Dispatch `event`, additionally reporting the outcome to `callback`.
    ///
    /// The callback runs when the terminal action fires, before the returned
    /// future resolves with the same outcome. It is not called when the chain
    /// ends without a terminal action.
    ///
    /// Like every [`Dispatch`], this does nothing until polled: dropping the
    /// returned future unpolled means no handler runs and the callback never
    /// fires.
    pub fn dispatch_with_callback<F>(&self, event: E, context: Context, callback: F) -> Dispatch
    where
        F: FnOnce(Result<Reply, Error>) + Send + 'static,
    {
        self.start(event, context, Some(Box::new(callback)))
    }

    /// Dispatch `event`, failing with [`DispatchError::Timeout`] if it does
    /// not resolve within `duration`.
    #[cfg(feature = "timeout")]
    pub async fn dispatch_timeout(
        &self,
        event: E,
        duration: Duration,
    ) -> Result<Option<Reply>, Error> {
        tokio::time::timeout(duration, self.dispatch(event))
            .await
            .unwrap_or_else(|_| Err(DispatchError::Timeout(duration).into()))
    }

    fn start(&self, event: E, context: Context, callback: Option<Callback>) -> Dispatch {
        Dispatch::new(self, Request::new(event, context), callback)
    }
}

impl<E> fmt::Debug for Router<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("entries", &self.read_entries().len())
            .finish()
    }
}
