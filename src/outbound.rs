//! Outbound request decoration.
//!
//! # Responsibilities
//! - Re-attach the correlation ID recorded on ingestion to outgoing requests
//! - Propagate the current span as W3C trace context
//!
//! # Design Decisions
//! - Uses the same header constant the router reads, so peers running this
//!   router recognise the echo
//! - Missing correlation ID or span means the header is simply not set

use opentelemetry::global;
use opentelemetry::propagation::Injector;
use opentelemetry::trace::TraceContextExt;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use tracing_opentelemetry::OpenTelemetrySpanExt;

use crate::events::{Context, CORRELATION_ID_HEADER};

struct HeaderInjector<'a>(&'a mut HeaderMap);

impl Injector for HeaderInjector<'_> {
    fn set(&mut self, key: &str, value: String) {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(key.as_bytes()),
            HeaderValue::from_str(&value),
        ) {
            self.0.insert(name, value);
        }
    }
}

/// Add correlation and trace headers for `ctx` to `headers`.
pub fn inject_outbound_headers(ctx: &Context, headers: &mut HeaderMap) {
    if let Some(id) = ctx.correlation_id() {
        match (
            HeaderName::from_bytes(CORRELATION_ID_HEADER.as_bytes()),
            HeaderValue::from_str(id),
        ) {
            (Ok(name), Ok(value)) => {
                tracing::debug!(correlation_id = %id, "Injecting correlation ID into request headers");
                headers.insert(name, value);
            }
            _ => {
                tracing::warn!(correlation_id = %id, "Correlation ID is not a valid header value");
            }
        }
    }

    let cx = tracing::Span::current().context();
    let span = cx.span();
    let span_context = span.span_context();
    if span_context.is_valid() {
        tracing::debug!(
            trace_id = %span_context.trace_id(),
            span_id = %span_context.span_id(),
            "Injecting span context into request headers"
        );
        global::get_text_map_propagator(|propagator| {
            propagator.inject_context(&cx, &mut HeaderInjector(headers))
        });
    }
}

/// Decorate `reqwest` requests with the event context.
pub trait RequestBuilderExt {
    fn with_event_context(self, ctx: &Context) -> Self;
}

impl RequestBuilderExt for reqwest::RequestBuilder {
    fn with_event_context(self, ctx: &Context) -> Self {
        let mut headers = HeaderMap::new();
        inject_outbound_headers(ctx, &mut headers);
        self.headers(headers)
    }
}

/// Mint a fresh correlation ID for a write this service originates.
pub fn new_correlation_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
