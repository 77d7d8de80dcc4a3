//! Correlation processor and its middleware.

use std::sync::Arc;

use crate::events::{Action, Context, Event};
use crate::history::{CacheError, HistoryCache, LocalCache};
use crate::observability::metrics;
use crate::routing::{handler_fn, middleware_fn, Handler, Middleware};

/// Construction parameters for [`CorrelationProcessor`].
pub struct ProcessorConfig {
    pub strategy: super::SkipStrategy,
    pub cache: Arc<dyn HistoryCache>,
}

impl Default for ProcessorConfig {
    /// Update-only strategy over a default [`LocalCache`].
    fn default() -> Self {
        Self {
            strategy: super::SkipStrategy::default(),
            cache: Arc::new(LocalCache::default()),
        }
    }
}

/// Decides whether an event echoes one of this service's own writes.
pub struct CorrelationProcessor {
    strategy: super::SkipStrategy,
    cache: Arc<dyn HistoryCache>,
}

impl CorrelationProcessor {
    pub fn new(config: ProcessorConfig) -> Self {
        tracing::debug!(
            backend = config.cache.backend(),
            component = "correlation",
            "Correlation processor configured"
        );
        Self {
            strategy: config.strategy,
            cache: config.cache,
        }
    }

    pub fn strategy(&self) -> &super::SkipStrategy {
        &self.strategy
    }

    /// Record `correlation_id` and report whether processing should be skipped.
    ///
    /// The first sighting of an ID never skips. Later sightings skip when the
    /// strategy covers (`action`, `subject`).
    pub async fn should_skip(
        &self,
        correlation_id: &str,
        action: Action,
        subject: &str,
    ) -> Result<bool, CacheError> {
        let existed = self.cache.exists_or_store(correlation_id).await?;
        if !existed {
            return Ok(false);
        }
        Ok(self.strategy.skips(action, subject))
    }

    /// Global middleware that suppresses echoed events.
    pub fn middleware(self: &Arc<Self>) -> Middleware {
        let processor = Arc::clone(self);
        middleware_fn(move |next: Handler| {
            let processor = Arc::clone(&processor);
            handler_fn(move |ctx: Context, event: Arc<Event>| {
                let processor = Arc::clone(&processor);
                let next = Arc::clone(&next);
                async move {
                    let correlation_id = event.correlation_id().to_string();
                    let subject = ctx.subject().to_string();

                    if subject.is_empty() || correlation_id.is_empty() {
                        return next(ctx, event).await;
                    }

                    tracing::debug!(
                        correlation_id = %correlation_id,
                        component = "correlation-id-middleware",
                        "Extracted correlation ID from event"
                    );

                    let skip = processor
                        .should_skip(&correlation_id, event.action, &subject)
                        .await?;

                    if skip {
                        tracing::info!(
                            action = %event.action,
                            subject = %subject,
                            resource_id = %event.extension_resource_id,
                            correlation_id = %correlation_id,
                            component = "correlation-id-middleware",
                            "Skipping event"
                        );
                        metrics::record_event_skipped(&subject, event.action);
                        return Ok(());
                    }

                    next(ctx.with_correlation_id(correlation_id), event).await
                }
            })
        })
    }
}
