//! Router dispatch and correlation scenarios.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use event_router::correlation::{CorrelationProcessor, ProcessorConfig, SkipStrategy};
use event_router::history::{HistoryCache, LocalCache};
use event_router::routing::{Router, RouterBuilder, RouterError};
use event_router::{Action, Context, Event};
use parking_lot::Mutex;

mod common;

fn correlated(strategy: SkipStrategy, cache: Arc<dyn HistoryCache>) -> RouterBuilder {
    let processor = Arc::new(CorrelationProcessor::new(ProcessorConfig { strategy, cache }));
    let mut builder = Router::builder();
    builder.use_middleware(processor.middleware());
    builder
}

#[tokio::test]
async fn test_every_route_invokes_its_handler_once() {
    let counters: Vec<(Action, Arc<AtomicUsize>)> = Action::ALL
        .into_iter()
        .map(|a| (a, Arc::new(AtomicUsize::new(0))))
        .collect();

    let mut builder = Router::builder();
    for (action, calls) in &counters {
        let handler = common::counting_handler(calls.clone());
        match action {
            Action::Create => builder.create("groups", handler, vec![]),
            Action::Update => builder.update("groups", handler, vec![]),
            Action::Delete => builder.delete("groups", handler, vec![]),
            Action::Approve => builder.approve("groups", handler, vec![]),
            Action::Deny => builder.deny("groups", handler, vec![]),
            Action::Revoke => builder.revoke("groups", handler, vec![]),
        };
    }
    let router = builder.build();

    for (action, _) in &counters {
        router
            .process(Context::new(), "groups", Arc::new(Event::new(*action)))
            .await
            .unwrap();
    }

    for (action, calls) in &counters {
        assert_eq!(calls.load(Ordering::SeqCst), 1, "{action} handler");
    }
}

#[tokio::test]
async fn test_unknown_subject_and_action() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut builder = Router::builder();
    builder.create("groups", common::counting_handler(calls.clone()), vec![]);
    let router = builder.build();

    let err = router
        .process(Context::new(), "users", Arc::new(Event::new(Action::Create)))
        .await
        .unwrap_err();
    assert!(matches!(err, RouterError::NotFound { ref subject } if subject == "users"));

    router
        .process(Context::new(), "groups", Arc::new(Event::new(Action::Revoke)))
        .await
        .unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_global_middleware_is_a_stack() {
    let log = Arc::new(Mutex::new(Vec::new()));

    let mut builder = Router::builder();
    let handler_log = log.clone();
    builder
        .use_middleware(common::marker(log.clone(), "A"))
        .use_middleware(common::marker(log.clone(), "B"))
        .update(
            "groups",
            event_router::handler_fn(move |_ctx, _event| {
                let log = handler_log.clone();
                async move {
                    log.lock().push("handler".to_string());
                    Ok(())
                }
            }),
            vec![common::marker(log.clone(), "route")],
        );
    let router = builder.build();

    router
        .process(Context::new(), "groups", Arc::new(Event::new(Action::Update)))
        .await
        .unwrap();

    assert_eq!(
        *log.lock(),
        vec!["B in", "A in", "route in", "handler", "route out", "A out", "B out"]
    );
}

#[tokio::test]
async fn test_handler_error_is_forwarded() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut builder = correlated(SkipStrategy::update_only(), Arc::new(LocalCache::default()));
    builder.update("groups", common::failing_handler(calls.clone(), "ldap timeout"), vec![]);
    let router = builder.build();

    let event = Arc::new(Event::new(Action::Update).with_correlation_id("abc"));
    let err = router
        .process(Context::new(), "groups", event)
        .await
        .unwrap_err();
    assert!(matches!(err, RouterError::Handler(_)));
    assert_eq!(err.to_string(), "ldap timeout");
}

#[tokio::test]
async fn test_update_echo_is_skipped() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut builder = correlated(SkipStrategy::update_only(), Arc::new(LocalCache::default()));
    builder.update("groups", common::counting_handler(calls.clone()), vec![]);
    let router = builder.build();

    let event = Arc::new(Event::new(Action::Update).with_correlation_id("abc"));

    router
        .process(Context::new(), "groups", event.clone())
        .await
        .unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    router.process(Context::new(), "groups", event).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_first_sighting_is_recorded_even_when_handler_fails() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut builder = correlated(SkipStrategy::update_only(), Arc::new(LocalCache::default()));
    builder.update("groups", common::failing_handler(calls.clone(), "boom"), vec![]);
    let router = builder.build();

    let event = Arc::new(Event::new(Action::Update).with_correlation_id("abc"));
    assert!(router
        .process(Context::new(), "groups", event.clone())
        .await
        .is_err());
    assert!(router.process(Context::new(), "groups", event).await.is_ok());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_create_echo_depends_on_strategy() {
    for (strategy, expected_calls) in [(SkipStrategy::skip_all(), 1), (SkipStrategy::update_only(), 2)] {
        let calls = Arc::new(AtomicUsize::new(0));
        let cache: Arc<dyn HistoryCache> = Arc::new(LocalCache::default());
        cache.exists_or_store("seen-before").await.unwrap();

        let mut builder = correlated(strategy, cache);
        builder.create("groups", common::counting_handler(calls.clone()), vec![]);
        let router = builder.build();

        // Once on a fresh ID, once on the previously seen one.
        let fresh = Arc::new(Event::new(Action::Create).with_correlation_id("fresh"));
        let seen = Arc::new(Event::new(Action::Create).with_correlation_id("seen-before"));
        router.process(Context::new(), "groups", fresh).await.unwrap();
        router.process(Context::new(), "groups", seen).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), expected_calls);
    }
}

#[tokio::test]
async fn test_empty_correlation_id_never_skips_or_records() {
    let cache = Arc::new(LocalCache::default());
    let calls = Arc::new(AtomicUsize::new(0));
    let mut builder = correlated(SkipStrategy::skip_all(), cache.clone());
    builder.update("groups", common::counting_handler(calls.clone()), vec![]);
    let router = builder.build();

    let no_header = Arc::new(Event::new(Action::Update));
    let empty_header = Arc::new(Event::new(Action::Update).with_correlation_id(""));
    for event in [no_header.clone(), empty_header.clone(), no_header, empty_header] {
        router.process(Context::new(), "groups", event).await.unwrap();
    }

    assert_eq!(calls.load(Ordering::SeqCst), 4);
    assert!(cache.is_empty());
}

#[tokio::test]
async fn test_cache_failure_aborts_dispatch() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut builder = correlated(SkipStrategy::update_only(), Arc::new(common::UnavailableCache));
    builder.update("groups", common::counting_handler(calls.clone()), vec![]);
    let router = builder.build();

    let event = Arc::new(Event::new(Action::Update).with_correlation_id("abc"));
    let err = router
        .process(Context::new(), "groups", event)
        .await
        .unwrap_err();

    assert!(matches!(err, RouterError::Cache(_)));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_correlation_id_reaches_handler_context() {
    let seen = Arc::new(Mutex::new(None));
    let s = seen.clone();
    let mut builder = correlated(SkipStrategy::update_only(), Arc::new(LocalCache::default()));
    builder.delete(
        "groups",
        event_router::handler_fn(move |ctx, _event| {
            let s = s.clone();
            async move {
                *s.lock() = ctx.correlation_id().map(str::to_string);
                Ok(())
            }
        }),
        vec![],
    );
    let router = builder.build();

    let event = Arc::new(Event::new(Action::Delete).with_correlation_id("abc"));
    router.process(Context::new(), "groups", event).await.unwrap();
    assert_eq!(seen.lock().as_deref(), Some("abc"));
}

#[tokio::test]
async fn test_concurrent_duplicates_run_once() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut builder = correlated(SkipStrategy::update_only(), Arc::new(LocalCache::default()));
    builder.update("groups", common::counting_handler(calls.clone()), vec![]);
    let router = Arc::new(builder.build());

    let event = Arc::new(Event::new(Action::Update).with_correlation_id("dup"));
    let mut tasks = Vec::new();
    for _ in 0..32 {
        let router = router.clone();
        let event = event.clone();
        tasks.push(tokio::spawn(async move {
            router.process(Context::new(), "groups", event).await
        }));
    }
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
