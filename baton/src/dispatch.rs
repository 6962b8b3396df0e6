//! # Dispatch Engine
//!
//! Every call to `Router::dispatch` builds a fresh [`DispatchState`]: a work
//! queue seeded with a snapshot of the router's entries, the request, the
//! response and the error in flight. The engine then advances through the
//! queue one unit at a time:
//!
//! - A mounted router is replaced by its own entries. Mounting a router
//!   that is still being expanded puts [`DispatchError::CyclicMount`] in
//!   flight instead.
//! - A group is dropped when its pattern does not match, and otherwise
//!   replaced by its units after the bound params are merged.
//! - A handler runs when its kind fits the current state: normal handlers
//!   while no error is in flight, error-aware handlers only while one is.
//!
//! The [`Flow`] a handler returns decides how to continue. Panics and
//! `Err` results become the error in flight. When the queue runs dry with an
//! error still in flight, it is delivered to the caller.

use crate::router::{Entry, Router, Unit};
use baton_core::{
    Callback, DispatchError, Error, Flow, Handler, HandlerFuture, PathMatcher, Reply, Request,
    Response, Routable, completion,
};
use futures::{FutureExt, future::BoxFuture};
use std::{
    any::Any,
    collections::VecDeque,
    fmt,
    future::Future,
    panic::{self, AssertUnwindSafe},
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

#[cfg(feature = "tracing")]
use tracing::Instrument;

/// One unit of pending work.
enum Work<E> {
    Group(Entry<E>),
    Mount(Router<E>),
    Handler(Handler<E>),
    /// End of a mounted router's entries.
    Leave,
}

/// Per-call state. Owned by exactly one dispatch and never shared.
pub(crate) struct DispatchState<E> {
    queue: VecDeque<Work<E>>,
    /// Routers whose entries are currently being expanded, outermost first.
    mounted: Vec<Router<E>>,
    request: Request<E>,
    response: Response,
    error: Option<Error>,
}

impl<E: Routable> DispatchState<E> {
    pub(crate) fn new(root: &Router<E>, request: Request<E>, response: Response) -> Self {
        Self {
            queue: root.entries().into_iter().map(Work::Group).collect(),
            mounted: vec![root.clone()],
            request,
            response,
            error: None,
        }
    }

    fn mount(&mut self, router: Router<E>) {
        if self.mounted.iter().any(|active| active.ptr_eq(&router)) {
            #[cfg(feature = "tracing")]
            tracing::debug!(depth = self.mounted.len(), "router mounted inside itself");
            self.error
                .get_or_insert_with(|| DispatchError::CyclicMount.into());
            return;
        }
        self.queue.push_front(Work::Leave);
        self.splice_entries(router.entries());
        self.mounted.push(router);
    }

    fn splice_entries(&mut self, entries: Vec<Entry<E>>) {
        for entry in entries.into_iter().rev() {
            self.queue.push_front(Work::Group(entry));
        }
    }

    fn splice_units(&mut self, units: &[Unit<E>]) {
        for unit in units.iter().rev() {
            let work = match unit {
                Unit::Handler(handler) => Work::Handler(handler.clone()),
                Unit::Mount(router) => Work::Mount(router.clone()),
            };
            self.queue.push_front(work);
        }
    }

    /// Drops the normal handlers at the front of the queue, leaving any
    /// mounted router whose entries run out on the way.
    fn skip_stack(&mut self) {
        loop {
            match self.queue.front() {
                Some(Work::Handler(Handler::Normal(_))) => {}
                Some(Work::Leave) => {
                    self.mounted.pop();
                }
                _ => return,
            }
            self.queue.pop_front();
        }
    }

    fn expand(&mut self, matcher: &dyn PathMatcher, entry: Entry<E>) {
        if entry.units.is_empty() {
            return;
        }
        if let Some(pattern) = &entry.pattern {
            match matcher.match_path(pattern, self.request.path()) {
                Ok(Some(params)) => self.request.merge_params(params),
                Ok(None) => {
                    #[cfg(feature = "tracing")]
                    tracing::trace!(%pattern, "pattern did not match, skipping group");
                    return;
                }
                Err(err) => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(%pattern, error = %err, "invalid route pattern");
                    self.error
                        .get_or_insert_with(|| DispatchError::Pattern(err).into());
                    return;
                }
            }
        }
        self.splice_units(&entry.units);
    }

    /// Runs `handler` if it may run in the current state.
    ///
    /// Returns `None` when the handler was skipped.
    async fn invoke(&mut self, handler: Handler<E>) -> Option<Result<Flow, Error>> {
        match handler {
            Handler::Normal(middleware) => {
                if self.error.is_some() {
                    return None;
                }
                let (req, res) = (self.request.clone(), self.response.clone());
                Some(guarded(|| middleware.handle_dyn(req, res)).await)
            }
            Handler::ErrorAware(middleware) => {
                let err = self.error.take()?;
                let (req, res) = (self.request.clone(), self.response.clone());
                Some(guarded(|| middleware.handle_error_dyn(req, res, err)).await)
            }
        }
    }

    /// Drives the queue until a terminal action, a halt, or exhaustion.
    pub(crate) async fn run(mut self, matcher: Arc<dyn PathMatcher>) {
        while let Some(work) = self.queue.pop_front() {
            let handler = match work {
                Work::Mount(router) => {
                    self.mount(router);
                    continue;
                }
                Work::Leave => {
                    self.mounted.pop();
                    continue;
                }
                Work::Group(entry) => {
                    self.expand(&*matcher, entry);
                    continue;
                }
                Work::Handler(handler) => handler,
            };

            #[cfg(feature = "tracing")]
            tracing::trace!(?handler, error_in_flight = self.error.is_some(), "next handler");

            let Some(outcome) = self.invoke(handler).await else {
                continue;
            };
            if self.response.is_sent() {
                return;
            }
            match outcome {
                Ok(Flow::Next) => {}
                Ok(Flow::Fail(err)) | Err(err) => self.error = Some(err),
                Ok(Flow::Route) => self.skip_stack(),
                Ok(Flow::RouteWith(err)) => {
                    self.error = Some(err);
                    self.skip_stack();
                }
                Ok(Flow::Halt) => return,
            }
        }

        if let Some(err) = self.error.take() {
            #[cfg(feature = "tracing")]
            tracing::debug!(error = %err, "unhandled error reached the end of the chain");
            // Only fails if a handle held elsewhere already responded.
            let _ = self.response.error(err);
        }
    }
}

/// Calls a handler, turning panics into errors.
async fn guarded<'a, F>(call: F) -> Result<Flow, Error>
where
    F: FnOnce() -> HandlerFuture<'a>,
{
    let future = match panic::catch_unwind(AssertUnwindSafe(call)) {
        Ok(future) => future,
        Err(payload) => return Err(panicked(payload)),
    };
    AssertUnwindSafe(future)
        .catch_unwind()
        .await
        .unwrap_or_else(|payload| Err(panicked(payload)))
}

fn panicked(payload: Box<dyn Any + Send>) -> Error {
    let message = if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "panic payload was not a string".to_owned()
    };
    #[cfg(feature = "tracing")]
    tracing::debug!(%message, "handler panicked");
    DispatchError::HandlerPanicked(message).into()
}

/// The deferred result of a dispatch.
///
/// Resolves to `Ok(Some(reply))` after a handler sends, `Err(error)` after a
/// handler calls `error` or an error reaches the end of the chain, and
/// `Ok(None)` when the chain ends without a terminal action.
#[must_use = "a dispatch does nothing unless polled"]
pub struct Dispatch {
    inner: BoxFuture<'static, Result<Option<Reply>, Error>>,
}

impl Dispatch {
    pub(crate) fn new<E: Routable>(
        root: &Router<E>,
        request: Request<E>,
        callback: Option<Callback>,
    ) -> Self {
        let (completer, completion) = completion::channel(callback);
        let matcher = Arc::clone(root.matcher());
        let state = DispatchState::new(root, request, Response::new(completer));

        #[cfg(feature = "tracing")]
        let span = tracing::debug_span!("dispatch", path = %state.request.path());

        let future = async move {
            state.run(matcher).await;
            completion.await
        };

        #[cfg(feature = "tracing")]
        let future = future.instrument(span);

        Self {
            inner: Box::pin(future),
        }
    }
}

impl Future for Dispatch {
    type Output = Result<Option<Reply>, Error>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.inner.as_mut().poll(cx)
    }
}

impl fmt::Debug for Dispatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatch").finish_non_exhaustive()
    }
}
