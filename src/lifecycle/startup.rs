//! Startup orchestration.
//!
//! # Responsibilities
//! - Turn validated configuration into a history cache, a correlation
//!   processor and a frozen router
//! - Open (or create) the NATS KV bucket for the distributed cache
//!
//! # Design Decisions
//! - Global middleware order: correlation first, trace context last, so the
//!   span is open before the correlation check runs
//! - Subsystems initialize in order, not concurrently

use std::sync::Arc;
use std::time::Duration;

use async_nats::jetstream::{self, kv};
use thiserror::Error;

use crate::config::{CacheBackend, CorrelationConfig, HistoryCacheConfig, ServiceConfig, StrategyKind};
use crate::correlation::{CorrelationProcessor, ProcessorConfig, SkipStrategy};
use crate::events::Action;
use crate::history::{BoxError, HistoryCache, KvCache, LocalCache};
use crate::observability::tracing::trace_context_middleware;
use crate::processor::EventProcessor;
use crate::routing::Router;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to connect to NATS at {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: BoxError,
    },

    #[error("failed to open history bucket {bucket:?}: {source}")]
    Bucket {
        bucket: String,
        #[source]
        source: BoxError,
    },
}

/// Skip strategy described by `config`.
///
/// Unknown action names are ignored here; validation rejects them earlier.
pub fn skip_strategy(config: &CorrelationConfig) -> SkipStrategy {
    match config.strategy {
        StrategyKind::UpdateOnly => SkipStrategy::update_only(),
        StrategyKind::SkipAll => SkipStrategy::skip_all(),
        StrategyKind::Custom => SkipStrategy::custom(config.custom.iter().filter_map(
            |(action, subjects)| {
                let action = action.parse::<Action>().ok()?;
                Some((action, subjects.iter().cloned().collect()))
            },
        )),
    }
}

pub fn local_history_cache(config: &HistoryCacheConfig) -> Arc<dyn HistoryCache> {
    Arc::new(LocalCache::new(
        config.capacity,
        Duration::from_secs(config.ttl_secs),
    ))
}

/// Fetch the history bucket, creating it with `max_age = ttl_secs` if missing.
pub async fn open_history_bucket(
    client: &async_nats::Client,
    config: &HistoryCacheConfig,
) -> Result<kv::Store, StartupError> {
    let js = jetstream::new(client.clone());

    if let Ok(store) = js.get_key_value(&config.bucket).await {
        tracing::info!(bucket = %config.bucket, "Using existing history bucket");
        return Ok(store);
    }

    tracing::info!(bucket = %config.bucket, ttl_secs = config.ttl_secs, "Creating history bucket");
    js.create_key_value(kv::Config {
        bucket: config.bucket.clone(),
        history: 1,
        max_age: Duration::from_secs(config.ttl_secs),
        ..Default::default()
    })
    .await
    .map_err(|e| StartupError::Bucket {
        bucket: config.bucket.clone(),
        source: Box::new(e),
    })
}

/// Build the configured history cache backend.
pub async fn build_history_cache(
    config: &HistoryCacheConfig,
    client: &async_nats::Client,
) -> Result<Arc<dyn HistoryCache>, StartupError> {
    match config.backend {
        CacheBackend::Local => Ok(local_history_cache(config)),
        CacheBackend::Nats => {
            let store = open_history_bucket(client, config).await?;
            Ok(Arc::new(KvCache::new(store)))
        }
    }
}

/// Register every processor, then install the global middleware and freeze.
pub fn build_router(
    config: &ServiceConfig,
    cache: Arc<dyn HistoryCache>,
    processors: &[&dyn EventProcessor],
) -> Router {
    let correlation = Arc::new(CorrelationProcessor::new(ProcessorConfig {
        strategy: skip_strategy(&config.correlation),
        cache,
    }));

    let mut builder = Router::builder();
    for processor in processors {
        processor.register(&mut builder);
    }

    builder.use_middleware(correlation.middleware());
    if config.observability.trace_context {
        builder.use_middleware(trace_context_middleware());
    }

    let router = builder.build();
    tracing::info!(subjects = ?router.subjects(), "Router built");
    router
}
