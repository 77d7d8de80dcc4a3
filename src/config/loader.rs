//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ServiceConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<ServiceConfig, ConfigError> {
    let config: ServiceConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ServiceConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{CacheBackend, StrategyKind};
    use std::io::Write;

    #[test]
    fn test_load_full_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[transport]
url = "nats://nats.internal:4222"
subject_prefix = "governor.events"
queue_size = 2

[history_cache]
backend = "nats"
ttl_secs = 300
bucket = "history"

[correlation]
strategy = "custom"

[correlation.custom]
update = ["*"]
create = ["groups"]

[observability]
log_format = "json"
metrics_enabled = false

[[routes]]
subject = "groups"
actions = ["create", "update"]
"#
        )
        .unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.transport.subject_prefix, "governor.events");
        assert_eq!(config.transport.queue_size, 2);
        assert_eq!(config.transport.queue_group, "event-router");
        assert_eq!(config.history_cache.backend, CacheBackend::Nats);
        assert_eq!(config.history_cache.capacity, 128);
        assert_eq!(config.correlation.strategy, StrategyKind::Custom);
        assert_eq!(config.correlation.custom["create"], vec!["groups"]);
        assert_eq!(config.routes.len(), 1);
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.history_cache.backend, CacheBackend::Local);
        assert_eq!(config.correlation.strategy, StrategyKind::UpdateOnly);
        assert!(config.routes.is_empty());
    }

    #[test]
    fn test_parse_error() {
        let err = parse_config("[history_cache]\nbackend = \"redis\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_validation_error() {
        let err = parse_config("[history_cache]\ncapacity = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref errors) if errors.len() == 1));
        assert!(err.to_string().contains("history_cache.capacity"));
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/nonexistent/event-router.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
