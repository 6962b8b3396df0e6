//! Tower integration.
//!
//! A [`Router`] is a `tower::Service` over its event type, so it can sit
//! behind tower layers or be driven by anything that speaks `Service`.
//!
//! ```rust
//! use baton::{Flow, Router, middleware};
//! use tower::{Service, ServiceExt};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let mut router = Router::<&'static str>::new().with([middleware(|_req, res| async move {
//!     res.send("pong")?;
//!     Ok(Flow::Halt)
//! })]);
//!
//! let reply = router.ready().await.unwrap().call("/ping").await.unwrap();
//! assert_eq!(reply.unwrap().body, "pong");
//! # }
//! ```

use crate::{dispatch::Dispatch, router::Router};
use baton_core::{Error, Reply, Routable};
use std::task::{Context, Poll};
use tower::Service;

impl<E: Routable> Service<E> for Router<E> {
    type Response = Option<Reply>;
    type Error = Error;
    type Future = Dispatch;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, event: E) -> Self::Future {
        self.dispatch(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use baton_std::testing::Recorder;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_oneshot_dispatches() {
        let recorder = Recorder::new();
        let router = Router::<&'static str>::new().with([recorder.send("send", "ok")]);

        let reply = router.clone().oneshot("/").await.unwrap().unwrap();
        assert_eq!(reply.body, "ok");
        assert_eq!(recorder.labels(), ["send"]);
    }

    #[tokio::test]
    async fn test_unhandled_error_is_service_error() {
        let recorder = Recorder::new();
        let router = Router::<&'static str>::new()
            .with([recorder.fail("boom", Error::msg("boom"))]);

        let err = router.oneshot("/").await.unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }
}
