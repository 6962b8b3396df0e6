//! # Handlers
//!
//! Handlers are the units a router runs. Each one is registered with an
//! explicit kind:
//!
//! - [`Middleware`] runs while no error is in flight.
//! - [`ErrorMiddleware`] runs only while an error is in flight and receives it.
//!
//! A handler returns a [`Flow`], which tells the engine how to continue. The
//! returned future is awaited before the next unit of work is considered,
//! so there is never more than one handler running per dispatch.
//!
//! # Usage Patterns
//!
//! 1. **Closures**: [`middleware`] / [`error_middleware`]
//! 2. **Types**: `impl Middleware<MyEvent> for MyHandler`, then
//!    [`Handler::normal`]

use crate::{error::Error, message::Message, request::Request, response::Response};
use std::{fmt, future::Future, pin::Pin, sync::Arc};

/// A boxed handler future.
pub type HandlerFuture<'a> = Pin<Box<dyn Future<Output = Result<Flow, Error>> + Send + 'a>>;

/// How the dispatch continues after a handler returns.
///
/// Returning `Err(e)` from a handler behaves like `Flow::Fail(e)`.
#[must_use = "a flow decides whether the chain continues"]
#[derive(Debug)]
pub enum Flow {
    /// Advance to the next unit of work.
    Next,
    /// Advance with `error` in flight.
    Fail(Error),
    /// Discard the remaining normal handlers of the current stack, then
    /// advance.
    Route,
    /// Like [`Flow::Route`], with `error` in flight.
    RouteWith(Error),
    /// Stop without a terminal action.
    Halt,
}

impl Flow {
    /// `Flow::Fail` from anything convertible into [`Error`].
    pub fn fail(err: impl Into<Error>) -> Self {
        Flow::Fail(err.into())
    }

    /// `Flow::RouteWith` from anything convertible into [`Error`].
    pub fn route_with(err: impl Into<Error>) -> Self {
        Flow::RouteWith(err.into())
    }
}

/// A handler that runs while no error is in flight.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a `Middleware` for `{E}`",
    label = "missing `Middleware<{E}>` implementation",
    note = "Middleware must implement `handle` for requests carrying `{E}`."
)]
pub trait Middleware<E: Message>: Send + Sync + 'static {
    /// Handle the request.
    fn handle(
        &self,
        req: Request<E>,
        res: Response,
    ) -> impl Future<Output = Result<Flow, Error>> + Send;
}

/// A handler that runs only while an error is in flight.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not an `ErrorMiddleware` for `{E}`",
    label = "missing `ErrorMiddleware<{E}>` implementation",
    note = "Error middleware must implement `handle_error` for requests carrying `{E}`."
)]
pub trait ErrorMiddleware<E: Message>: Send + Sync + 'static {
    /// Handle the request and the error in flight.
    fn handle_error(
        &self,
        req: Request<E>,
        res: Response,
        err: Error,
    ) -> impl Future<Output = Result<Flow, Error>> + Send;
}

/// Object-safe version of [`Middleware`].
pub trait DynMiddleware<E>: Send + Sync + 'static {
    /// Handle the request (dynamic dispatch version).
    fn handle_dyn(&self, req: Request<E>, res: Response) -> HandlerFuture<'_>;
}

impl<E: Message, T: Middleware<E>> DynMiddleware<E> for T {
    fn handle_dyn(&self, req: Request<E>, res: Response) -> HandlerFuture<'_> {
        Box::pin(self.handle(req, res))
    }
}

/// Object-safe version of [`ErrorMiddleware`].
pub trait DynErrorMiddleware<E>: Send + Sync + 'static {
    /// Handle the request and error (dynamic dispatch version).
    fn handle_error_dyn(&self, req: Request<E>, res: Response, err: Error) -> HandlerFuture<'_>;
}

impl<E: Message, T: ErrorMiddleware<E>> DynErrorMiddleware<E> for T {
    fn handle_error_dyn(&self, req: Request<E>, res: Response, err: Error) -> HandlerFuture<'_> {
        Box::pin(self.handle_error(req, res, err))
    }
}

struct FnMiddleware<F>(F);

impl<E, F, Fut> Middleware<E> for FnMiddleware<F>
where
    E: Message,
    F: Fn(Request<E>, Response) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Flow, Error>> + Send,
{
    fn handle(
        &self,
        req: Request<E>,
        res: Response,
    ) -> impl Future<Output = Result<Flow, Error>> + Send {
        (self.0)(req, res)
    }
}

struct FnErrorMiddleware<F>(F);

impl<E, F, Fut> ErrorMiddleware<E> for FnErrorMiddleware<F>
where
    E: Message,
    F: Fn(Request<E>, Response, Error) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Flow, Error>> + Send,
{
    fn handle_error(
        &self,
        req: Request<E>,
        res: Response,
        err: Error,
    ) -> impl Future<Output = Result<Flow, Error>> + Send {
        (self.0)(req, res, err)
    }
}

/// A registered handler, tagged with its kind.
pub enum Handler<E> {
    /// Runs while no error is in flight.
    Normal(Arc<dyn DynMiddleware<E>>),
    /// Runs only while an error is in flight.
    ErrorAware(Arc<dyn DynErrorMiddleware<E>>),
}

impl<E: Message> Handler<E> {
    /// Wrap a [`Middleware`].
    pub fn normal<M: Middleware<E>>(middleware: M) -> Self {
        Handler::Normal(Arc::new(middleware))
    }

    /// Wrap an [`ErrorMiddleware`].
    pub fn error_aware<M: ErrorMiddleware<E>>(middleware: M) -> Self {
        Handler::ErrorAware(Arc::new(middleware))
    }
}

impl<E> Handler<E> {
    /// Whether this handler only runs with an error in flight.
    pub fn is_error_aware(&self) -> bool {
        matches!(self, Handler::ErrorAware(_))
    }
}

// `#[derive(Clone)]` would require `E: Clone`.
impl<E> Clone for Handler<E> {
    fn clone(&self) -> Self {
        match self {
            Handler::Normal(inner) => Handler::Normal(Arc::clone(inner)),
            Handler::ErrorAware(inner) => Handler::ErrorAware(Arc::clone(inner)),
        }
    }
}

impl<E> fmt::Debug for Handler<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Handler::Normal(_) => f.write_str("Handler::Normal"),
            Handler::ErrorAware(_) => f.write_str("Handler::ErrorAware"),
        }
    }
}

/// Build a normal handler from an async closure.
///
/// # Example
///
/// ```rust
/// use baton_core::{Flow, Handler, middleware};
///
/// let hello: Handler<&'static str> = middleware(|_req, res| async move {
///     res.send("Hello")?;
///     Ok(Flow::Halt)
/// });
/// assert!(!hello.is_error_aware());
/// ```
pub fn middleware<E, F, Fut>(f: F) -> Handler<E>
where
    E: Message,
    F: Fn(Request<E>, Response) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Flow, Error>> + Send + 'static,
{
    Handler::normal(FnMiddleware(f))
}

/// Build an error-aware handler from an async closure.
///
/// # Example
///
/// ```rust
/// use baton_core::{Flow, Handler, error_middleware};
///
/// let report: Handler<&'static str> = error_middleware(|_req, res, err| async move {
///     res.status(500).send(err.to_string())?;
///     Ok(Flow::Halt)
/// });
/// assert!(report.is_error_aware());
/// ```
pub fn error_middleware<E, F, Fut>(f: F) -> Handler<E>
where
    E: Message,
    F: Fn(Request<E>, Response, Error) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Flow, Error>> + Send + 'static,
{
    Handler::error_aware(FnErrorMiddleware(f))
}
