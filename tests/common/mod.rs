//! Shared utilities for integration tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use event_router::history::{CacheError, HistoryCache};
use event_router::routing::{handler_fn, middleware_fn, Handler, Middleware, RouterError};
use event_router::transport::{EventClient, TransportError};
use parking_lot::Mutex;

/// Handler that counts invocations and succeeds.
pub fn counting_handler(calls: Arc<AtomicUsize>) -> Handler {
    handler_fn(move |_ctx, _event| {
        let calls = calls.clone();
        async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    })
}

/// Handler that counts invocations and fails with `message`.
#[allow(dead_code)]
pub fn failing_handler(calls: Arc<AtomicUsize>, message: &'static str) -> Handler {
    handler_fn(move |_ctx, _event| {
        let calls = calls.clone();
        async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(RouterError::handler(message))
        }
    })
}

/// Middleware that logs `"<name> in"` / `"<name> out"` around the next handler.
#[allow(dead_code)]
pub fn marker(log: Arc<Mutex<Vec<String>>>, name: &'static str) -> Middleware {
    middleware_fn(move |next: Handler| {
        let log = log.clone();
        handler_fn(move |ctx, event| {
            let log = log.clone();
            let next = next.clone();
            async move {
                log.lock().push(format!("{name} in"));
                let result = next(ctx, event).await;
                log.lock().push(format!("{name} out"));
                result
            }
        })
    })
}

/// History cache whose store is always down.
#[allow(dead_code)]
pub struct UnavailableCache;

#[async_trait]
impl HistoryCache for UnavailableCache {
    async fn exists_or_store(&self, _id: &str) -> Result<bool, CacheError> {
        Err(CacheError::new("unavailable", "store unreachable"))
    }

    async fn remove(&self, _id: &str) -> Result<(), CacheError> {
        Err(CacheError::new("unavailable", "store unreachable"))
    }

    fn backend(&self) -> &'static str {
        "unavailable"
    }
}

/// Event client that records subscriptions instead of opening them.
#[allow(dead_code)]
#[derive(Default)]
pub struct RecordingClient {
    pub subscriptions: Mutex<Vec<String>>,
    pub fail_on: Option<String>,
}

#[async_trait]
impl EventClient for RecordingClient {
    async fn subscribe(&self, subject: &str) -> Result<(), TransportError> {
        if self.fail_on.as_deref() == Some(subject) {
            return Err(TransportError::Subscribe {
                subject: subject.to_string(),
                source: "permission denied".into(),
            });
        }
        self.subscriptions.lock().push(subject.to_string());
        Ok(())
    }

    async fn shutdown(&self) -> Result<(), TransportError> {
        Ok(())
    }
}
