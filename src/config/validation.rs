//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (capacity, TTL, queue sizes > 0)
//! - Check that action names and addresses parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::{CacheBackend, ServiceConfig, StrategyKind};
use crate::events::Action;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let transport = &config.transport;
    if transport.url.is_empty() {
        errors.push(ValidationError::new("transport.url", "must not be empty"));
    }
    if transport.queue_size == 0 {
        errors.push(ValidationError::new("transport.queue_size", "must be at least 1"));
    }
    if transport.channel_capacity == 0 {
        errors.push(ValidationError::new(
            "transport.channel_capacity",
            "must be at least 1",
        ));
    }

    if transport.drain_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "transport.drain_timeout_secs",
            "must be at least 1",
        ));
    }

    let cache = &config.history_cache;
    if cache.capacity == 0 {
        errors.push(ValidationError::new("history_cache.capacity", "must be at least 1"));
    }
    if cache.ttl_secs == 0 {
        errors.push(ValidationError::new("history_cache.ttl_secs", "must be at least 1"));
    }
    if cache.backend == CacheBackend::Nats && cache.bucket.is_empty() {
        errors.push(ValidationError::new(
            "history_cache.bucket",
            "required for the nats backend",
        ));
    }

    let correlation = &config.correlation;
    if correlation.strategy == StrategyKind::Custom && correlation.custom.is_empty() {
        errors.push(ValidationError::new(
            "correlation.custom",
            "required when strategy is custom",
        ));
    }
    for (action, subjects) in &correlation.custom {
        if action.parse::<Action>().is_err() {
            errors.push(ValidationError::new(
                format!("correlation.custom.{action}"),
                "unknown action",
            ));
        }
        if subjects.is_empty() {
            errors.push(ValidationError::new(
                format!("correlation.custom.{action}"),
                "must list at least one subject or \"*\"",
            ));
        }
    }

    let observability = &config.observability;
    if observability.metrics_enabled
        && observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("invalid socket address {:?}", observability.metrics_address),
        ));
    }

    for (i, route) in config.routes.iter().enumerate() {
        if route.subject.is_empty() {
            errors.push(ValidationError::new(
                format!("routes[{i}].subject"),
                "must not be empty",
            ));
        }
        if route.actions.is_empty() {
            errors.push(ValidationError::new(
                format!("routes[{i}].actions"),
                "must not be empty",
            ));
        }
        for action in &route.actions {
            if action.parse::<Action>().is_err() {
                errors.push(ValidationError::new(
                    format!("routes[{i}].actions"),
                    format!("unknown action {action:?}"),
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::RouteConfig;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&ServiceConfig::default()), Ok(()));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = ServiceConfig::default();
        config.history_cache.capacity = 0;
        config.history_cache.ttl_secs = 0;
        config.correlation.strategy = StrategyKind::Custom;
        config.observability.metrics_address = "not-an-address".to_string();

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "history_cache.capacity",
                "history_cache.ttl_secs",
                "correlation.custom",
                "observability.metrics_address",
            ]
        );
    }

    #[test]
    fn test_nats_backend_needs_bucket() {
        let mut config = ServiceConfig::default();
        config.history_cache.backend = CacheBackend::Nats;
        config.history_cache.bucket.clear();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "history_cache.bucket");
    }

    #[test]
    fn test_route_actions_must_parse() {
        let mut config = ServiceConfig::default();
        config.routes.push(RouteConfig {
            subject: "groups".to_string(),
            actions: vec!["update".to_string(), "upsert".to_string()],
        });

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("upsert"));
    }

    #[test]
    fn test_metrics_address_ignored_when_disabled() {
        let mut config = ServiceConfig::default();
        config.observability.metrics_enabled = false;
        config.observability.metrics_address.clear();
        assert!(validate_config(&config).is_ok());
    }
}
