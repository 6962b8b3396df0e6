//! Timeout middleware for time-limited handlers.
//!
//! **Note**: This module requires the `tokio` runtime.

use baton_core::{DispatchError, Error, Flow, Message, Middleware, Request, Response};
use std::time::Duration;
use tokio::time::timeout;

/// Wraps a [`Middleware`] and fails with [`DispatchError::Timeout`] when it
/// does not finish in time.
///
/// The timeout error enters the chain like any other handler failure, so a
/// downstream error-aware handler can turn it into a response.
pub struct Timeout<M> {
    inner: M,
    duration: Duration,
}

impl<M> Timeout<M> {
    /// Create a new `Timeout` wrapping the given middleware.
    pub fn new(inner: M, duration: Duration) -> Self {
        Self { inner, duration }
    }

    /// Create a `Timeout` with the limit specified in milliseconds.
    pub fn millis(inner: M, millis: u64) -> Self {
        Self::new(inner, Duration::from_millis(millis))
    }

    /// Get the configured timeout duration.
    pub fn duration(&self) -> Duration {
        self.duration
    }
}

impl<E: Message, M: Middleware<E>> Middleware<E> for Timeout<M> {
    async fn handle(&self, req: Request<E>, res: Response) -> Result<Flow, Error> {
        match timeout(self.duration, self.inner.handle(req, res)).await {
            Ok(result) => result,
            Err(_) => Err(DispatchError::Timeout(self.duration).into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use baton_core::{Context, completion};

    struct Sleepy(Duration);

    impl Middleware<&'static str> for Sleepy {
        async fn handle(&self, _req: Request<&'static str>, _res: Response) -> Result<Flow, Error> {
            tokio::time::sleep(self.0).await;
            Ok(Flow::Next)
        }
    }

    fn parts() -> (Request<&'static str>, Response) {
        let (completer, _completion) = completion::channel(None);
        (Request::new("/", Context::new()), Response::new(completer))
    }

    #[tokio::test]
    async fn test_fast_handler_passes() {
        let (req, res) = parts();
        let flow = Timeout::millis(Sleepy(Duration::from_millis(1)), 500)
            .handle(req, res)
            .await
            .unwrap();
        assert!(matches!(flow, Flow::Next));
    }

    #[tokio::test]
    async fn test_slow_handler_times_out() {
        let (req, res) = parts();
        let err = Timeout::millis(Sleepy(Duration::from_secs(5)), 10)
            .handle(req, res)
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DispatchError>(),
            Some(DispatchError::Timeout(d)) if *d == Duration::from_millis(10)
        ));
    }
}
