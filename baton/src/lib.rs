//! # baton - Ordered Middleware Dispatch
//!
//! `baton` runs an event through an ordered chain of middleware. Each
//! handler receives the request and a response builder, and hands the baton
//! on by returning a [`Flow`]:
//!
//! - [`Flow::Next`] continues with the next handler.
//! - [`Flow::Fail`] (or an `Err`) puts an error in flight. Normal handlers
//!   are skipped until an error-aware handler takes it.
//! - [`Flow::Route`] skips the rest of the current registration group.
//! - [`Flow::Halt`] stops without responding.
//!
//! Handlers may be gated by a path pattern, and whole routers can be mounted
//! into others. The first call to [`Response::send`] or [`Response::error`]
//! completes the dispatch.
//!
//! ## Quick Start
//!
//! ```rust
//! use baton::{Flow, Router, error_middleware, middleware};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let router = Router::<&'static str>::new();
//! router
//!     .register([middleware(|_req, res| async move {
//!         res.set([("x-powered-by", "baton")]);
//!         Ok(Flow::Next)
//!     })])
//!     .register_at(
//!         "/users/:id",
//!         [middleware(|req, res| async move {
//!             res.status(200).send(format!("user {}", req.param("id").unwrap_or("?")))?;
//!             Ok(Flow::Halt)
//!         })],
//!     )
//!     .register([error_middleware(|_req, res, err| async move {
//!         res.status(500).send(err.to_string())?;
//!         Ok(Flow::Halt)
//!     })]);
//!
//! let reply = router.dispatch("/users/7").await.unwrap().unwrap();
//! assert_eq!(reply.body, "user 7");
//! assert_eq!(reply.headers["x-powered-by"], "baton");
//! # }
//! ```

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod dispatch;
mod macros;
mod router;
#[cfg(feature = "tower")]
mod service;

pub use dispatch::Dispatch;
pub use router::{Router, Unit};

pub use baton_core::{
    // Errors
    BoxError,
    // Completion
    Callback,
    // Request
    Context,
    DispatchError,
    // Handlers
    DynErrorMiddleware,
    DynMiddleware,
    Error,
    ErrorMiddleware,
    Flow,
    Handler,
    HandlerFuture,
    // Response
    Headers,
    MatchError,
    // Message
    Message,
    Middleware,
    // Routing
    Params,
    PathMatcher,
    Props,
    ProxyEvent,
    Reply,
    Request,
    Response,
    ResponseError,
    Routable,
    RoutePattern,
    error_middleware,
    match_regex,
    middleware,
};

/// Path matching implementations.
pub mod routing {
    #![allow(clippy::wildcard_imports)]
    pub use baton_std::routing::*;
}

/// Standard middleware.
pub mod std_middleware {
    #![allow(clippy::wildcard_imports)]
    pub use baton_std::middleware::*;
}

/// Testing utilities.
pub mod testing {
    #![allow(clippy::wildcard_imports)]
    pub use baton_std::testing::*;
}

/// Prelude module - common imports for baton.
///
/// ```rust
/// use baton::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        Error, ErrorMiddleware, Flow, Handler, Message, Middleware, Request, Response, Routable,
        Router, Unit, error_middleware, middleware,
    };
}
