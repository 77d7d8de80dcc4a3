//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::history::{DEFAULT_CAPACITY, DEFAULT_TTL};

/// Root configuration for the event router service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// Message transport (NATS) settings.
    pub transport: TransportConfig,

    /// Correlation-ID history cache settings.
    pub history_cache: HistoryCacheConfig,

    /// Skip strategy for echoed events.
    pub correlation: CorrelationConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Subjects and actions handled by the built-in echo processor.
    pub routes: Vec<RouteConfig>,
}

/// Transport configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TransportConfig {
    /// NATS server URL.
    pub url: String,

    /// Prefix prepended to every subscribed subject (`<prefix>.<subject>`).
    pub subject_prefix: String,

    /// Queue group shared by every replica.
    pub queue_group: String,

    /// Queue subscriptions opened per subject.
    pub queue_size: usize,

    /// Buffer between subscriptions and the dispatch loop.
    pub channel_capacity: usize,

    /// Seconds in-flight dispatches get to finish on shutdown.
    pub drain_timeout_secs: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            url: "nats://127.0.0.1:4222".to_string(),
            subject_prefix: "events".to_string(),
            queue_group: "event-router".to_string(),
            queue_size: 1,
            channel_capacity: 256,
            drain_timeout_secs: 30,
        }
    }
}

/// Which history cache implementation to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CacheBackend {
    /// In-process LRU cache. Correct for a single replica only.
    #[default]
    Local,
    /// NATS JetStream key-value bucket shared by the fleet.
    Nats,
}

/// History cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HistoryCacheConfig {
    pub backend: CacheBackend,

    /// Maximum entries kept by the local cache.
    pub capacity: usize,

    /// Entry lifetime in seconds (local TTL, or bucket max age for NATS).
    pub ttl_secs: u64,

    /// KV bucket name (NATS backend only).
    pub bucket: String,
}

impl Default for HistoryCacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::Local,
            capacity: DEFAULT_CAPACITY,
            ttl_secs: DEFAULT_TTL.as_secs(),
            bucket: "event-router-history".to_string(),
        }
    }
}

/// Skip strategy preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    #[default]
    UpdateOnly,
    SkipAll,
    Custom,
}

/// Correlation processing configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct CorrelationConfig {
    pub strategy: StrategyKind,

    /// Action name → subjects (`"*"` for all). Used when `strategy = "custom"`.
    pub custom: HashMap<String, Vec<String>>,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,

    /// Wrap every dispatch in a span, adopting the event's trace context.
    pub trace_context: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
            trace_context: true,
        }
    }
}

/// Route handled by the echo processor.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    pub subject: String,

    /// Action names, e.g. `["create", "update"]`.
    pub actions: Vec<String>,
}
