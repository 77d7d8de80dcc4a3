//! Distributed tracing support.
//!
//! # Responsibilities
//! - Extract trace context carried inside events
//! - Wrap every dispatch in a `process-event` span
//!
//! # Design Decisions
//! - Remote parent is adopted only when the carrier is non-empty
//! - The span lives exactly as long as the handler future

use std::collections::HashMap;
use std::sync::Arc;

use opentelemetry::global;
use tracing::Instrument;
use tracing_opentelemetry::OpenTelemetrySpanExt;

use crate::events::{Context, Event};
use crate::routing::{handler_fn, middleware_fn, Handler, Middleware};

/// Decode a carrier with the global text-map propagator.
pub fn extract_parent(carrier: &HashMap<String, String>) -> opentelemetry::Context {
    global::get_text_map_propagator(|propagator| propagator.extract(carrier))
}

/// Global middleware that opens a span per dispatch.
///
/// Register it after the correlation middleware so it runs first and the
/// correlation check happens inside the span.
pub fn trace_context_middleware() -> Middleware {
    middleware_fn(|next: Handler| {
        handler_fn(move |ctx: Context, event: Arc<Event>| {
            let next = next.clone();
            async move {
                tracing::debug!(
                    component = "trace-context-middleware",
                    "Extracting trace context from event"
                );

                let span = tracing::info_span!(
                    "process-event",
                    event.erd_id = %event.extension_resource_definition_id,
                    event.extension_id = %event.extension_id,
                    event.resource_id = %event.extension_resource_id,
                    event.resource_version = %event.version
                );

                if let Some(carrier) = event.trace_carrier() {
                    span.set_parent(extract_parent(carrier));
                }

                next(ctx, event).instrument(span).await
            }
        })
    })
}
