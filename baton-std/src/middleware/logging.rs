//! Logging middleware for request observation.

use baton_core::{Error, ErrorMiddleware, Flow, Middleware, Request, Response, Routable};
use std::fmt::Debug;

/// Logs requests and passes them on.
///
/// Registered as a normal handler it logs every request that reaches it;
/// registered as an error-aware handler it logs the error in flight and
/// forwards it unchanged.
///
/// # Example
///
/// ```rust
/// use baton_core::{Handler, ProxyEvent};
/// use baton_std::middleware::Logging;
///
/// let requests: Handler<ProxyEvent> = Handler::normal(Logging::named("api"));
/// let failures: Handler<ProxyEvent> = Handler::error_aware(Logging::named("api"));
/// # let _ = (requests, failures);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Logging {
    name: &'static str,
}

impl Logging {
    /// Create a `Logging` middleware with a default name.
    pub fn new() -> Self {
        Self { name: "router" }
    }

    /// Create a `Logging` middleware with a custom name.
    ///
    /// The name identifies the router in log output.
    pub fn named(name: &'static str) -> Self {
        Self { name }
    }
}

impl Default for Logging {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Middleware<E> for Logging
where
    E: Routable + Debug,
{
    async fn handle(&self, req: Request<E>, _res: Response) -> Result<Flow, Error> {
        #[cfg(feature = "tracing")]
        {
            tracing::debug!(
                name = %self.name,
                path = %req.path(),
                params = ?req.params(),
                event = ?req.event(),
                "dispatching request"
            );
        }

        #[cfg(not(feature = "tracing"))]
        {
            let _ = (self.name, req);
        }

        Ok(Flow::Next)
    }
}

impl<E> ErrorMiddleware<E> for Logging
where
    E: Routable + Debug,
{
    async fn handle_error(
        &self,
        req: Request<E>,
        _res: Response,
        err: Error,
    ) -> Result<Flow, Error> {
        #[cfg(feature = "tracing")]
        {
            tracing::warn!(name = %self.name, path = %req.path(), error = %err, "handler failed");
        }

        #[cfg(not(feature = "tracing"))]
        {
            let _ = (self.name, req);
        }

        Ok(Flow::Fail(err))
    }
}
