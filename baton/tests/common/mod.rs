#![allow(dead_code)]

use baton::{Context, Error, ProxyEvent, Reply};
use std::{
    fmt,
    sync::{Arc, Mutex},
};

// ============================================================================
// Test Events
// ============================================================================

pub fn get(path: &str) -> ProxyEvent {
    ProxyEvent::new("GET", path)
}

pub fn lambda_context() -> Context {
    Context::from([("function_name".to_owned(), "TestLambda".to_owned())])
}

// ============================================================================
// Test Errors
// ============================================================================

#[derive(Debug)]
pub struct TestError(pub &'static str);

impl fmt::Display for TestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl std::error::Error for TestError {}

pub fn test_error(message: &'static str) -> Error {
    Error::new(TestError(message))
}

// ============================================================================
// Callback Capture
// ============================================================================

/// Collects every outcome delivered to a completion callback.
#[derive(Clone, Default)]
pub struct Captured {
    outcomes: Arc<Mutex<Vec<Result<Reply, Error>>>>,
}

impl Captured {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn callback(&self) -> impl FnOnce(Result<Reply, Error>) + Send + 'static {
        let outcomes = Arc::clone(&self.outcomes);
        move |outcome| outcomes.lock().unwrap().push(outcome)
    }

    pub fn outcomes(&self) -> Vec<Result<Reply, Error>> {
        self.outcomes.lock().unwrap().clone()
    }

    pub fn single(&self) -> Result<Reply, Error> {
        let outcomes = self.outcomes();
        assert_eq!(outcomes.len(), 1, "callback should fire exactly once");
        outcomes.into_iter().next().unwrap()
    }
}
