//! Testing utilities for baton.
//!
//! This module provides utilities to make testing routers and handlers easier.
//!
//! # Features
//!
//! - [`Recorder`]: Builds handlers that record every invocation in order
//! - [`Call`]: One recorded invocation, with the params and error it saw
//! - [`ExactMatcher`]: A dependency-free matcher for literal paths

use baton_core::{
    Error, ErrorMiddleware, Flow, Handler, MatchError, Message, Middleware, Params, PathMatcher,
    Request, Response, RoutePattern, match_regex,
};
use std::sync::{Arc, Mutex, PoisonError};

// ============================================================================
// Recorder
// ============================================================================

/// One recorded handler invocation.
#[derive(Debug, Clone)]
pub struct Call {
    /// The label the handler was created with.
    pub label: String,
    /// Params visible to the handler.
    pub params: Option<Params>,
    /// The error handed to an error-aware handler.
    pub error: Option<Error>,
}

/// Builds handlers that record their invocations into a shared log.
///
/// # Example
///
/// ```rust,ignore
/// let recorder = Recorder::new();
/// router.register([recorder.next("a"), recorder.halt("b")]);
///
/// router.dispatch("/").await?;
///
/// assert_eq!(recorder.labels(), ["a", "b"]);
/// ```
#[derive(Clone, Default)]
pub struct Recorder {
    calls: Arc<Mutex<Vec<Call>>>,
}

impl Recorder {
    /// Create a recorder with an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    fn step<E: Message>(&self, label: &str, action: Action) -> Handler<E> {
        Handler::normal(Step {
            recorder: self.clone(),
            label: label.to_owned(),
            action,
        })
    }

    fn error_step<E: Message>(&self, label: &str, action: ErrorAction) -> Handler<E> {
        Handler::error_aware(ErrorStep {
            recorder: self.clone(),
            label: label.to_owned(),
            action,
        })
    }

    /// A handler that records and advances.
    pub fn next<E: Message>(&self, label: &str) -> Handler<E> {
        self.step(label, Action::Next)
    }

    /// A handler that records and stops the chain without responding.
    pub fn halt<E: Message>(&self, label: &str) -> Handler<E> {
        self.step(label, Action::Halt)
    }

    /// A handler that records and advances with `err` in flight.
    pub fn fail<E: Message>(&self, label: &str, err: Error) -> Handler<E> {
        self.step(label, Action::Fail(err))
    }

    /// A handler that records and skips the rest of its stack.
    pub fn route<E: Message>(&self, label: &str) -> Handler<E> {
        self.step(label, Action::Route)
    }

    /// A handler that records and sends `body`.
    pub fn send<E: Message>(&self, label: &str, body: &str) -> Handler<E> {
        self.step(label, Action::Send(body.to_owned()))
    }

    /// An error-aware handler that records and forwards the error unchanged.
    pub fn forward<E: Message>(&self, label: &str) -> Handler<E> {
        self.error_step(label, ErrorAction::Forward)
    }

    /// An error-aware handler that records and clears the error.
    pub fn recover<E: Message>(&self, label: &str) -> Handler<E> {
        self.error_step(label, ErrorAction::Recover)
    }

    /// An error-aware handler that records and resolves the dispatch with
    /// the error.
    pub fn reject<E: Message>(&self, label: &str) -> Handler<E> {
        self.error_step(label, ErrorAction::Reject)
    }

    fn push(&self, call: Call) {
        self.lock().push(call);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Call>> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// A copy of the full log.
    pub fn calls(&self) -> Vec<Call> {
        self.lock().clone()
    }

    /// Labels in invocation order.
    pub fn labels(&self) -> Vec<String> {
        self.lock().iter().map(|call| call.label.clone()).collect()
    }

    /// How many times the handler labelled `label` ran.
    pub fn count(&self, label: &str) -> usize {
        self.lock().iter().filter(|call| call.label == label).count()
    }

    /// Whether the handler labelled `label` ran at all.
    pub fn was_called(&self, label: &str) -> bool {
        self.count(label) > 0
    }

    /// Errors received by the error-aware handler labelled `label`.
    pub fn errors(&self, label: &str) -> Vec<Error> {
        self.lock()
            .iter()
            .filter(|call| call.label == label)
            .filter_map(|call| call.error.clone())
            .collect()
    }

    /// Clear the log.
    pub fn clear(&self) {
        self.lock().clear();
    }
}

enum Action {
    Next,
    Halt,
    Fail(Error),
    Route,
    Send(String),
}

struct Step {
    recorder: Recorder,
    label: String,
    action: Action,
}

impl<E: Message> Middleware<E> for Step {
    async fn handle(&self, req: Request<E>, res: Response) -> Result<Flow, Error> {
        self.recorder.push(Call {
            label: self.label.clone(),
            params: req.params().cloned(),
            error: None,
        });
        Ok(match &self.action {
            Action::Next => Flow::Next,
            Action::Halt => Flow::Halt,
            Action::Fail(err) => Flow::Fail(err.clone()),
            Action::Route => Flow::Route,
            Action::Send(body) => {
                res.send(body.as_str())?;
                Flow::Halt
            }
        })
    }
}

enum ErrorAction {
    Forward,
    Recover,
    Reject,
}

struct ErrorStep {
    recorder: Recorder,
    label: String,
    action: ErrorAction,
}

impl<E: Message> ErrorMiddleware<E> for ErrorStep {
    async fn handle_error(&self, req: Request<E>, res: Response, err: Error) -> Result<Flow, Error> {
        self.recorder.push(Call {
            label: self.label.clone(),
            params: req.params().cloned(),
            error: Some(err.clone()),
        });
        Ok(match self.action {
            ErrorAction::Forward => Flow::Fail(err),
            ErrorAction::Recover => Flow::Next,
            ErrorAction::Reject => {
                res.error(err)?;
                Flow::Halt
            }
        })
    }
}

// ============================================================================
// Exact Matcher
// ============================================================================

/// A matcher that compares path patterns literally.
///
/// Path patterns match only an identical path and never bind params; regex
/// patterns behave as with any other matcher. Handy for exercising a router
/// without committing to a pattern syntax.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactMatcher;

impl PathMatcher for ExactMatcher {
    fn match_path(
        &self,
        pattern: &RoutePattern,
        path: &str,
    ) -> Result<Option<Params>, MatchError> {
        Ok(match pattern {
            RoutePattern::Path(literal) => (&**literal == path).then(Params::new),
            RoutePattern::Regex(regex) => match_regex(regex, path),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use baton_core::{Context, completion};

    #[tokio::test]
    async fn test_recorder_logs_in_order() {
        let recorder = Recorder::new();
        let (completer, completion) = completion::channel(None);
        let res = Response::new(completer);
        let mut req = Request::new("/", Context::new());
        req.merge_params(Params::from([("id".into(), "7".into())]));

        let handlers: Vec<Handler<&'static str>> = vec![
            recorder.next("a"),
            recorder.send("b", "done"),
            recorder.reject("c"),
        ];
        for handler in &handlers {
            let flow = match handler {
                Handler::Normal(inner) => inner.handle_dyn(req.clone(), res.clone()).await,
                Handler::ErrorAware(inner) => {
                    inner
                        .handle_error_dyn(req.clone(), res.clone(), Error::msg("x"))
                        .await
                }
            };
            let _ = flow;
        }

        assert_eq!(recorder.labels(), ["a", "b", "c"]);
        assert_eq!(
            recorder.calls()[0].params.as_ref().and_then(|p| p.get("id")).map(String::as_str),
            Some("7")
        );
        assert_eq!(recorder.errors("c").len(), 1);
        assert_eq!(completion.await.unwrap().unwrap().body, "done");
    }

    #[test]
    fn test_exact_matcher() {
        let matcher = ExactMatcher;
        assert_eq!(
            matcher.match_path(&RoutePattern::from("/a"), "/a").unwrap(),
            Some(Params::new())
        );
        assert_eq!(matcher.match_path(&RoutePattern::from("/a/:b"), "/a/1").unwrap(), None);
    }
}
