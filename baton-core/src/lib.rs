//! # baton-core
//!
//! Core types and traits for the baton middleware dispatch engine.
//!
//! This crate has minimal dependencies and is what handler libraries and
//! matcher implementations build against; the router itself lives in the
//! `baton` crate.
//!
//! # Building Blocks
//!
//! - [`Handler`], [`Middleware`], [`ErrorMiddleware`] - the units a router runs
//! - [`Flow`] - the continuation a handler returns
//! - [`Request`] - event, context and params bound by matched patterns
//! - [`Response`] - the shared response builder with its terminal actions
//! - [`completion`] - the bridge from a terminal action to the caller
//! - [`PathMatcher`] - the contract route patterns are matched through
//!
//! # Error Types
//!
//! - [`Error`] - Identity-preserving error value carried through a dispatch
//! - [`DispatchError`] - Engine failures
//! - [`MatchError`] - Matcher failures
//! - [`ResponseError`] - Response builder misuse

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

pub mod completion;
mod error;
mod event;
mod handler;
mod matcher;
mod message;
mod request;
mod response;

pub use completion::{Callback, Completer, Completion};
pub use error::{BoxError, DispatchError, Error, MatchError, ResponseError};
pub use event::ProxyEvent;
pub use handler::{
    DynErrorMiddleware, DynMiddleware, ErrorMiddleware, Flow, Handler, HandlerFuture, Middleware,
    error_middleware, middleware,
};
pub use matcher::{Params, PathMatcher, RoutePattern, match_regex};
pub use message::{Message, Routable};
pub use request::{Context, Request};
pub use response::{Headers, Props, Reply, Response};
