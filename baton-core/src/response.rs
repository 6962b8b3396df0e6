//! # Response Builder
//!
//! A [`Response`] accumulates headers, status and scratch props across every
//! handler of one dispatch and exposes the two terminal actions, [`send`] and
//! [`error`]. The first terminal action resolves the dispatch; any later one
//! is rejected with [`ResponseError::AlreadySent`].
//!
//! [`send`]: Response::send
//! [`error`]: Response::error

use crate::{
    completion::Completer,
    error::{Error, ResponseError},
};
use std::{
    any::Any,
    collections::HashMap,
    fmt,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

/// Response headers.
pub type Headers = HashMap<String, String>;

/// The finalized response delivered to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// The body passed to `send`.
    pub body: String,
    /// Headers accumulated before `send`.
    pub headers: Headers,
    /// Status code at the time of `send`.
    pub status_code: u16,
}

/// Free-form scratch values handlers use to pass data down the chain.
#[derive(Default)]
pub struct Props {
    values: HashMap<String, Box<dyn Any + Send + Sync>>,
}

impl Props {
    /// Insert a value, replacing any previous value under `key`.
    pub fn insert<T: Any + Send + Sync>(&mut self, key: impl Into<String>, value: T) {
        self.values.insert(key.into(), Box::new(value));
    }

    /// Borrow a value if it exists and has type `T`.
    pub fn get<T: Any>(&self, key: &str) -> Option<&T> {
        self.values.get(key)?.downcast_ref::<T>()
    }

    /// Mutably borrow a value if it exists and has type `T`.
    pub fn get_mut<T: Any>(&mut self, key: &str) -> Option<&mut T> {
        self.values.get_mut(key)?.downcast_mut::<T>()
    }

    /// Remove a value. Returns whether it was present.
    pub fn remove(&mut self, key: &str) -> bool {
        self.values.remove(key).is_some()
    }

    /// Whether `key` holds a value of any type.
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Number of stored values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no values are stored.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Debug for Props {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.values.keys()).finish()
    }
}

struct State {
    headers: Headers,
    status_code: u16,
    body: Option<String>,
    props: Props,
    completer: Option<Completer>,
}

/// The mutable response shared by the handlers of one dispatch.
///
/// `Response` is a handle: clones refer to the same underlying state, which
/// lets a handler hand it to a spawned task and send later. State is never
/// shared between dispatches.
///
/// # Example
///
/// ```rust
/// use baton_core::{Response, completion};
///
/// let (completer, completion) = completion::channel(None);
/// let res = Response::new(completer);
/// res.set([("content-type", "text/plain")]).status(201);
/// res.send("created").unwrap();
///
/// let reply = futures::executor::block_on(completion).unwrap().unwrap();
/// assert_eq!(reply.status_code, 201);
/// assert_eq!(reply.body, "created");
/// ```
#[derive(Clone)]
pub struct Response {
    state: Arc<Mutex<State>>,
}

impl Response {
    /// Create a response resolved through `completer`.
    pub fn new(completer: Completer) -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                headers: Headers::new(),
                status_code: 200,
                body: None,
                props: Props::default(),
                completer: Some(completer),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Merge headers into the response.
    pub fn set<I, K, V>(&self, headers: I) -> &Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.lock().headers.extend(
            headers
                .into_iter()
                .map(|(name, value)| (name.into(), value.into())),
        );
        self
    }

    /// Set the status code.
    pub fn status(&self, code: u16) -> &Self {
        self.lock().status_code = code;
        self
    }

    /// Finalize with `body` and resolve the dispatch successfully.
    pub fn send(&self, body: impl Into<String>) -> Result<(), ResponseError> {
        let body = body.into();
        let (completer, reply) = {
            let mut state = self.lock();
            let completer = state.completer.take().ok_or(ResponseError::AlreadySent)?;
            state.body = Some(body.clone());
            let reply = Reply {
                body,
                headers: state.headers.clone(),
                status_code: state.status_code,
            };
            (completer, reply)
        };
        completer.succeed(reply);
        Ok(())
    }

    /// Resolve the dispatch with `err`, unmodified.
    pub fn error(&self, err: impl Into<Error>) -> Result<(), ResponseError> {
        let completer = self
            .lock()
            .completer
            .take()
            .ok_or(ResponseError::AlreadySent)?;
        completer.fail(err.into());
        Ok(())
    }

    /// Whether a terminal action has fired.
    pub fn is_sent(&self) -> bool {
        self.lock().completer.is_none()
    }

    /// Current value of a header.
    pub fn header(&self, name: &str) -> Option<String> {
        self.lock().headers.get(name).cloned()
    }

    /// Snapshot of the headers.
    pub fn headers(&self) -> Headers {
        self.lock().headers.clone()
    }

    /// Current status code.
    pub fn status_code(&self) -> u16 {
        self.lock().status_code
    }

    /// The body, once `send` has been called.
    pub fn body(&self) -> Option<String> {
        self.lock().body.clone()
    }

    /// Store a scratch value.
    pub fn insert_prop<T: Any + Send + Sync>(&self, key: impl Into<String>, value: T) -> &Self {
        self.lock().props.insert(key, value);
        self
    }

    /// Clone a scratch value out.
    pub fn prop<T: Any + Clone>(&self, key: &str) -> Option<T> {
        self.lock().props.get::<T>(key).cloned()
    }

    /// Update a scratch value in place, returning what `f` returns.
    pub fn update_prop<T: Any, R>(&self, key: &str, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        self.lock().props.get_mut::<T>(key).map(f)
    }

    /// Remove a scratch value.
    pub fn remove_prop(&self, key: &str) -> bool {
        self.lock().props.remove(key)
    }

    /// Run `f` with mutable access to all props.
    pub fn with_props<R>(&self, f: impl FnOnce(&mut Props) -> R) -> R {
        f(&mut self.lock().props)
    }
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("Response")
            .field("headers", &state.headers)
            .field("status_code", &state.status_code)
            .field("body", &state.body)
            .field("props", &state.props)
            .field("sent", &state.completer.is_none())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::{self, Completion};
    use futures::executor::block_on;

    fn response() -> (Response, Completion) {
        let (completer, completion) = completion::channel(None);
        (Response::new(completer), completion)
    }

    #[test]
    fn test_defaults() {
        let (res, _completion) = response();
        assert_eq!(res.status_code(), 200);
        assert!(res.headers().is_empty());
        assert!(res.body().is_none());
        assert!(!res.is_sent());
        assert!(res.with_props(|props| props.is_empty()));
    }

    #[test]
    fn test_chained_builder() {
        let (res, completion) = response();
        res.set([("a", "1"), ("b", "2")]).status(404);
        res.set([("b", "3")]);
        res.send("Hello world").unwrap();

        let reply = block_on(completion).unwrap().unwrap();
        assert_eq!(reply.status_code, 404);
        assert_eq!(reply.body, "Hello world");
        assert_eq!(reply.headers.get("a").map(String::as_str), Some("1"));
        assert_eq!(reply.headers.get("b").map(String::as_str), Some("3"));
    }

    #[test]
    fn test_second_terminal_action_is_rejected() {
        let (res, completion) = response();
        res.send("first").unwrap();
        assert_eq!(res.send("second"), Err(ResponseError::AlreadySent));
        assert_eq!(res.error(Error::msg("late")), Err(ResponseError::AlreadySent));
        assert!(res.is_sent());

        let reply = block_on(completion).unwrap().unwrap();
        assert_eq!(reply.body, "first");
    }

    #[test]
    fn test_error_is_delivered_unmodified() {
        let (res, completion) = response();
        let err = Error::msg("Error");
        res.error(err.clone()).unwrap();

        let delivered = block_on(completion).unwrap_err();
        assert!(delivered.ptr_eq(&err));
        assert_eq!(delivered.to_string(), "Error");
    }

    #[test]
    fn test_props_are_shared_between_clones() {
        let (res, _completion) = response();
        res.insert_prop("test", 1u32);

        let other = res.clone();
        other.update_prop::<u32, _>("test", |n| *n += 1);
        res.update_prop::<u32, _>("test", |n| *n += 1);

        assert_eq!(res.prop::<u32>("test"), Some(3));
        assert_eq!(res.prop::<String>("test"), None);
        assert!(res.remove_prop("test"));
        assert!(!res.remove_prop("test"));
    }
}
