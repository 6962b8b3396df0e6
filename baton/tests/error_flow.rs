mod common;

use baton::{
    DispatchError, Error, Flow, ProxyEvent, Router, error_middleware, middleware,
    testing::Recorder,
};
use common::{Captured, get, test_error};
use std::sync::{Arc, Mutex};

#[tokio::test]
async fn test_error_reaches_next_error_handler() {
    let recorder = Recorder::new();
    let first = test_error("test error");
    let wrapped: Arc<Mutex<Option<Error>>> = Arc::default();

    let slot = Arc::clone(&wrapped);
    let rewrap = error_middleware(move |_req, _res, err: Error| {
        let slot = Arc::clone(&slot);
        async move {
            let next = Error::msg(format!("wrapped: {err}"));
            *slot.lock().unwrap() = Some(next.clone());
            Ok(Flow::Fail(next))
        }
    });

    let router = Router::<ProxyEvent>::new();
    router.register([
        recorder.fail("fail", first.clone()),
        recorder.next("skipped"),
        recorder.forward("forward"),
        rewrap,
        recorder.next("skipped"),
        recorder.reject("reject"),
    ]);

    let err = router.dispatch(get("/")).await.unwrap_err();

    let second = wrapped.lock().unwrap().clone().unwrap();
    assert!(!recorder.was_called("skipped"));
    assert!(recorder.errors("forward")[0].ptr_eq(&first));
    assert!(recorder.errors("reject")[0].ptr_eq(&second));
    assert!(err.ptr_eq(&second));
    assert_eq!(err.to_string(), "wrapped: test error");
}

#[tokio::test]
async fn test_panics_become_errors() {
    let recorder = Recorder::new();
    let router = Router::<ProxyEvent>::new();
    router
        .register([
            middleware(|req, _res| async move {
                if req.path() == "/" {
                    panic!("handler exploded");
                }
                Ok(Flow::Next)
            }),
            recorder.next("skipped"),
            recorder.forward("first"),
        ])
        .register([recorder.next("skipped"), recorder.forward("second")]);

    let err = router.dispatch(get("/")).await.unwrap_err();

    assert!(!recorder.was_called("skipped"));
    assert_eq!(recorder.count("first"), 1);
    assert_eq!(recorder.count("second"), 1);
    assert!(recorder.errors("first")[0].ptr_eq(&recorder.errors("second")[0]));
    assert!(err.ptr_eq(&recorder.errors("second")[0]));
    assert!(matches!(
        err.downcast_ref::<DispatchError>(),
        Some(DispatchError::HandlerPanicked(message)) if message == "handler exploded"
    ));
}

#[tokio::test]
async fn test_err_return_is_identical_to_fail() {
    let recorder = Recorder::new();
    let original = test_error("returned");
    let thrown = original.clone();

    let router = Router::<ProxyEvent>::new();
    router.register([
        middleware(move |_req, _res| {
            let thrown = thrown.clone();
            async move { Err(thrown) }
        }),
        recorder.next("skipped"),
        recorder.recover("recover"),
        recorder.halt("after"),
    ]);

    let outcome = router.dispatch(get("/")).await;

    assert!(matches!(outcome, Ok(None)));
    assert!(recorder.errors("recover")[0].ptr_eq(&original));
    assert_eq!(recorder.labels(), ["recover", "after"]);
}

#[tokio::test]
async fn test_async_failure_after_sub_router_is_caught() {
    let recorder = Recorder::new();
    let failure = test_error("rejected later");
    let thrown = failure.clone();

    let sub = Router::<ProxyEvent>::new();
    sub.register_at("/test", [recorder.next("sub")]);

    let router = Router::<ProxyEvent>::new();
    router
        .register(baton::units![
            &sub,
            middleware(move |_req, _res| {
                let thrown = thrown.clone();
                async move {
                    tokio::task::yield_now().await;
                    Err(thrown)
                }
            }),
        ])
        .register([recorder.recover("handler")]);

    router.dispatch(get("/test")).await.unwrap();

    assert_eq!(recorder.labels(), ["sub", "handler"]);
    assert!(recorder.errors("handler")[0].ptr_eq(&failure));
}

#[tokio::test]
async fn test_rethrown_error_reaches_callback_unchanged() {
    let captured = Captured::new();
    let original = test_error("unhandled error");
    let thrown = original.clone();

    let router = Router::<ProxyEvent>::new();
    router
        .register([middleware(move |_req, _res| {
            let thrown = thrown.clone();
            async move { Err(thrown) }
        })])
        .register([error_middleware(|_req, _res, err| async move { Err(err) })]);

    let err = router
        .dispatch_with_callback(get("/"), Default::default(), captured.callback())
        .await
        .unwrap_err();

    assert!(err.ptr_eq(&original));
    assert!(captured.single().unwrap_err().ptr_eq(&original));
}

#[tokio::test]
async fn test_unhandled_failure_rejects_the_dispatch() {
    let original = test_error("unhandled error");
    let thrown = original.clone();

    let router = Router::<ProxyEvent>::new();
    router.register([middleware(move |_req, _res| {
        let thrown = thrown.clone();
        async move {
            tokio::task::yield_now().await;
            Err(thrown)
        }
    })]);

    let err = router.dispatch(get("/")).await.unwrap_err();
    assert!(err.ptr_eq(&original));
    assert!(err.is::<common::TestError>());
}

#[tokio::test]
async fn test_route_with_skips_to_error_handler() {
    let captured = Captured::new();
    let recorder = Recorder::new();
    let original = test_error("Test Error");

    let router = Router::<ProxyEvent>::new();
    router
        .register([recorder.route("route"), recorder.next("skipped")])
        .register([recorder.next("b")])
        .register([
            recorder.fail("fail", original.clone()),
            recorder.next("skipped"),
            error_middleware(|_req, _res, err| async move { Ok(Flow::RouteWith(err)) }),
            recorder.next("skipped"),
            recorder.reject("reject"),
        ])
        .register([recorder.next("skipped"), recorder.reject("never")]);

    router
        .dispatch_with_callback(get("/"), Default::default(), captured.callback())
        .await
        .unwrap_err();

    assert!(!recorder.was_called("skipped"));
    assert!(!recorder.was_called("never"));
    assert_eq!(recorder.labels(), ["route", "b", "fail", "reject"]);
    assert!(captured.single().unwrap_err().ptr_eq(&original));
}

#[tokio::test]
async fn test_error_handlers_are_skipped_without_error() {
    let recorder = Recorder::new();
    let router = Router::<ProxyEvent>::new();
    router.register([
        recorder.next("a"),
        recorder.reject("unused"),
        recorder.halt("b"),
    ]);

    router.dispatch(get("/")).await.unwrap();

    assert_eq!(recorder.labels(), ["a", "b"]);
}

#[tokio::test]
async fn test_newer_error_replaces_error_in_flight() {
    let recorder = Recorder::new();
    let replacement = test_error("second");

    let router = Router::<ProxyEvent>::new();
    router.register([
        recorder.fail("first", test_error("first")),
        recorder.recover("clear"),
        recorder.fail("second", replacement.clone()),
        recorder.reject("reject"),
    ]);

    let err = router.dispatch(get("/")).await.unwrap_err();

    assert!(err.ptr_eq(&replacement));
    assert_eq!(recorder.labels(), ["first", "clear", "second", "reject"]);
}
