//! # Completion Resolver
//!
//! Bridges the terminal action of a dispatch to the caller. A [`Completer`]
//! is owned by the response of one dispatch and fires at most once; the
//! matching [`Completion`] is the deferred result the caller awaits. When a
//! callback is supplied it receives the same outcome, right after the
//! deferred result has been handed its copy.

use crate::{error::Error, response::Reply};
use futures::channel::oneshot;
use std::{
    fmt,
    future::Future,
    pin::Pin,
    task::{Context, Poll, ready},
};

/// Node-style completion callback: `Ok(reply)` on success, `Err(error)` on
/// failure.
pub type Callback = Box<dyn FnOnce(Result<Reply, Error>) + Send + 'static>;

/// Create a completer and the deferred result it resolves.
pub fn channel(callback: Option<Callback>) -> (Completer, Completion) {
    let (sender, receiver) = oneshot::channel();
    (Completer { sender, callback }, Completion { receiver })
}

/// The resolving side of a dispatch. Consumed by the first terminal action.
pub struct Completer {
    sender: oneshot::Sender<Result<Reply, Error>>,
    callback: Option<Callback>,
}

impl Completer {
    /// Resolve successfully.
    pub fn succeed(self, reply: Reply) {
        self.resolve(Ok(reply));
    }

    /// Resolve with a failure.
    pub fn fail(self, err: Error) {
        self.resolve(Err(err));
    }

    fn resolve(self, outcome: Result<Reply, Error>) {
        // Deliver to the deferred result first so a panicking callback
        // cannot lose the outcome. The receiver may already be gone.
        let _ = self.sender.send(outcome.clone());
        if let Some(callback) = self.callback {
            callback(outcome);
        }
    }
}

impl fmt::Debug for Completer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completer")
            .field("has_callback", &self.callback.is_some())
            .finish()
    }
}

/// The deferred result of a dispatch.
///
/// Resolves to `Ok(Some(reply))` after `send`, `Err(error)` after `error` or
/// an unhandled failure, and `Ok(None)` when every handle to the response was
/// dropped without a terminal action.
#[must_use = "a dispatch failure is only observable by awaiting its completion"]
#[derive(Debug)]
pub struct Completion {
    receiver: oneshot::Receiver<Result<Reply, Error>>,
}

impl Future for Completion {
    type Output = Result<Option<Reply>, Error>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let outcome = match ready!(Pin::new(&mut self.receiver).poll(cx)) {
            Ok(Ok(reply)) => Ok(Some(reply)),
            Ok(Err(err)) => Err(err),
            Err(oneshot::Canceled) => Ok(None),
        };
        Poll::Ready(outcome)
    }
}
