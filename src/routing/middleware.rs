//! Handler and middleware types.
//!
//! A [`Handler`] is an async function of `(Context, Arc<Event>)`. A
//! [`Middleware`] takes a handler and returns a new one wrapping it.
//! Both are reference counted so a composed chain can be shared by every
//! concurrent dispatch.

use std::future::Future;
use std::sync::Arc;

use futures_util::future::BoxFuture;

use super::RouterError;
use crate::events::{Context, Event};

pub type HandlerFuture = BoxFuture<'static, Result<(), RouterError>>;

pub type Handler = Arc<dyn Fn(Context, Arc<Event>) -> HandlerFuture + Send + Sync>;

pub type Middleware = Arc<dyn Fn(Handler) -> Handler + Send + Sync>;

/// Build a [`Handler`] from an async closure.
pub fn handler_fn<F, Fut>(f: F) -> Handler
where
    F: Fn(Context, Arc<Event>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), RouterError>> + Send + 'static,
{
    Arc::new(move |ctx: Context, event: Arc<Event>| -> HandlerFuture { Box::pin(f(ctx, event)) })
}

/// Build a [`Middleware`] from a closure.
pub fn middleware_fn<F>(f: F) -> Middleware
where
    F: Fn(Handler) -> Handler + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Apply `middlewares` in order; the last one ends up outermost.
pub(crate) fn compose(handler: Handler, middlewares: &[Middleware]) -> Handler {
    middlewares
        .iter()
        .fold(handler, |inner, middleware| middleware(inner))
}
