//! Error types for baton.
//!
//! This module provides the error values that travel through a dispatch:
//!
//! - [`Error`] - The shared, identity-preserving error value handed to
//!   error-aware handlers and delivered to callers
//! - [`DispatchError`] - Failures raised by the dispatch engine itself
//! - [`MatchError`] - Failures reported by a path matcher
//! - [`ResponseError`] - Misuse of the response builder

use std::{fmt, sync::Arc, time::Duration};
use thiserror::Error;

/// A boxed error type for dynamic error handling.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The error value carried through a dispatch.
///
/// Cloning is cheap and keeps the identity of the underlying error, so the
/// value an error-aware handler forwards is the exact value the next one
/// receives, and the same value can reach both a callback and the dispatch
/// future. Any `std::error::Error` converts into it, which makes `?` work
/// inside handlers.
#[derive(Clone)]
pub struct Error {
    inner: Arc<dyn std::error::Error + Send + Sync + 'static>,
}

impl Error {
    /// Wraps a concrete error.
    pub fn new<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(err),
        }
    }

    /// Creates an error from a plain message.
    pub fn msg(message: impl Into<String>) -> Self {
        Self::new(MessageError(message.into()))
    }

    /// Wraps an already boxed error.
    pub fn from_boxed(err: BoxError) -> Self {
        Self {
            inner: Arc::from(err),
        }
    }

    /// Returns `true` if both values point at the same underlying error.
    pub fn ptr_eq(&self, other: &Error) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.inner), Arc::as_ptr(&other.inner))
    }

    /// Returns `true` if the underlying error is of type `T`.
    pub fn is<T: std::error::Error + 'static>(&self) -> bool {
        self.inner.is::<T>()
    }

    /// Attempts to downcast the underlying error to `T`.
    pub fn downcast_ref<T: std::error::Error + 'static>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    /// Borrows the underlying error as a trait object.
    pub fn as_std(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        &*self.inner
    }
}

impl<E> From<E> for Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn from(err: E) -> Self {
        Self::new(err)
    }
}

impl AsRef<dyn std::error::Error + Send + Sync + 'static> for Error {
    fn as_ref(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        self.as_std()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.inner, f)
    }
}

#[derive(Debug, Error)]
#[error("{0}")]
struct MessageError(String);

/// Errors raised by the dispatch engine while driving a chain.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// A handler panicked while being called or polled.
    #[error("handler panicked: {0}")]
    HandlerPanicked(String),

    /// A handler or a whole dispatch exceeded its time budget.
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// A route pattern could not be matched.
    #[error("route pattern error: {0}")]
    Pattern(#[from] MatchError),

    /// A router was reached again while its own entries were being expanded.
    #[error("router is mounted inside itself")]
    CyclicMount,
}

/// Errors reported by a path matcher.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MatchError {
    /// The pattern could not be compiled.
    #[error("invalid route pattern `{pattern}`: {reason}")]
    InvalidPattern {
        /// The pattern as it was registered.
        pattern: String,
        /// Why the matcher rejected it.
        reason: String,
    },
}

/// Errors returned by the response builder.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseError {
    /// `send` or `error` was called after a terminal action already fired.
    #[error("a terminal action has already fired for this response")]
    AlreadySent,
}
