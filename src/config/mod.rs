//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (read & deserialize)
//!     → validation.rs (semantic checks)
//!     → ServiceConfig (validated, immutable)
//!     → lifecycle::startup builds cache, processor, router
//! ```
//!
//! # Design Decisions
//! - Config is read once at startup; routes never change while serving
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    CacheBackend, CorrelationConfig, HistoryCacheConfig, LogFormat, ObservabilityConfig,
    RouteConfig, ServiceConfig, StrategyKind, TransportConfig,
};
pub use validation::{validate_config, ValidationError};
