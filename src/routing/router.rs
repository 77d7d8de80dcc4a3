//! Route table and dispatch.
//!
//! # Responsibilities
//! - Collect (subject, action) → handler bindings during setup
//! - Compose route and global middleware once, at build time
//! - Dispatch events to the bound handler
//! - Report which subjects need a subscription
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(1) subject and action lookup via HashMap
//! - Unknown subject is an explicit error, unknown action a silent no-op

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use super::middleware::compose;
use super::{Handler, Middleware, RouterError};
use crate::events::{Action, Context, Event};
use crate::observability::metrics;

/// Mutable registration phase of a [`Router`].
#[derive(Default)]
pub struct RouterBuilder {
    routes: HashMap<String, HashMap<Action, Handler>>,
    middlewares: Vec<Middleware>,
}

impl RouterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `handler` to (`subject`, `action`), wrapped in `middlewares`.
    ///
    /// Route middlewares are applied in order, so the last one listed runs
    /// first. Registering the same key twice replaces the earlier handler.
    pub fn route(
        &mut self,
        subject: impl Into<String>,
        action: Action,
        handler: Handler,
        middlewares: Vec<Middleware>,
    ) -> &mut Self {
        let subject = subject.into();
        tracing::debug!(action = %action, subject = %subject, component = "eventrouter", "Adding route");

        let handler = compose(handler, &middlewares);
        if self
            .routes
            .entry(subject.clone())
            .or_default()
            .insert(action, handler)
            .is_some()
        {
            tracing::debug!(action = %action, subject = %subject, "Replaced existing route");
        }
        self
    }

    pub fn create(
        &mut self,
        subject: impl Into<String>,
        handler: Handler,
        middlewares: Vec<Middleware>,
    ) -> &mut Self {
        self.route(subject, Action::Create, handler, middlewares)
    }

    pub fn update(
        &mut self,
        subject: impl Into<String>,
        handler: Handler,
        middlewares: Vec<Middleware>,
    ) -> &mut Self {
        self.route(subject, Action::Update, handler, middlewares)
    }

    pub fn delete(
        &mut self,
        subject: impl Into<String>,
        handler: Handler,
        middlewares: Vec<Middleware>,
    ) -> &mut Self {
        self.route(subject, Action::Delete, handler, middlewares)
    }

    pub fn approve(
        &mut self,
        subject: impl Into<String>,
        handler: Handler,
        middlewares: Vec<Middleware>,
    ) -> &mut Self {
        self.route(subject, Action::Approve, handler, middlewares)
    }

    pub fn deny(
        &mut self,
        subject: impl Into<String>,
        handler: Handler,
        middlewares: Vec<Middleware>,
    ) -> &mut Self {
        self.route(subject, Action::Deny, handler, middlewares)
    }

    pub fn revoke(
        &mut self,
        subject: impl Into<String>,
        handler: Handler,
        middlewares: Vec<Middleware>,
    ) -> &mut Self {
        self.route(subject, Action::Revoke, handler, middlewares)
    }

    /// Push a global middleware. The most recently pushed one runs first on
    /// the way in and last on the way out.
    pub fn use_middleware(&mut self, middleware: Middleware) -> &mut Self {
        self.middlewares.push(middleware);
        self
    }

    /// Subjects registered so far.
    pub fn subjects(&self) -> Vec<String> {
        sorted_subjects(&self.routes)
    }

    /// Freeze the table, composing the global chain around every handler.
    pub fn build(self) -> Router {
        let routes = self
            .routes
            .into_iter()
            .map(|(subject, actions)| {
                let actions = actions
                    .into_iter()
                    .map(|(action, handler)| (action, compose(handler, &self.middlewares)))
                    .collect();
                (subject, actions)
            })
            .collect();

        Router { routes }
    }
}

/// Immutable dispatch table. Share it behind an `Arc`.
pub struct Router {
    routes: HashMap<String, HashMap<Action, Handler>>,
}

impl Router {
    pub fn builder() -> RouterBuilder {
        RouterBuilder::new()
    }

    /// Dispatch `event` received on `subject`.
    pub async fn process(
        &self,
        ctx: Context,
        subject: &str,
        event: Arc<Event>,
    ) -> Result<(), RouterError> {
        let start = Instant::now();
        tracing::info!(
            resource_id = %event.extension_resource_id,
            action = %event.action,
            subject = %subject,
            component = "eventrouter",
            "Processing event"
        );

        let Some(actions) = self.routes.get(subject) else {
            metrics::record_event(subject, event.action, "not_found");
            return Err(RouterError::NotFound {
                subject: subject.to_string(),
            });
        };

        let ctx = ctx.with_subject(subject);

        let Some(handler) = actions.get(&event.action) else {
            tracing::debug!(action = %event.action, subject = %subject, "No handler for action");
            metrics::record_event(subject, event.action, "unrouted");
            return Ok(());
        };

        let action = event.action;
        let result = handler(ctx, event).await;

        let outcome = if result.is_ok() { "handled" } else { "failed" };
        metrics::record_event(subject, action, outcome);
        metrics::record_dispatch_duration(subject, start);

        result
    }

    /// Every subject with at least one bound action, sorted.
    pub fn subjects(&self) -> Vec<String> {
        sorted_subjects(&self.routes)
    }

    /// True if (`subject`, `action`) has a handler.
    pub fn has_route(&self, subject: &str, action: Action) -> bool {
        self.routes
            .get(subject)
            .is_some_and(|actions| actions.contains_key(&action))
    }
}

fn sorted_subjects(routes: &HashMap<String, HashMap<Action, Handler>>) -> Vec<String> {
    let mut subjects: Vec<String> = routes
        .iter()
        .filter(|(_, actions)| !actions.is_empty())
        .map(|(subject, _)| subject.clone())
        .collect();
    subjects.sort();
    subjects
}
