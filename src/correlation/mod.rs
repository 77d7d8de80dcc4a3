//! Correlation-ID loop suppression.
//!
//! # Data Flow
//! ```text
//! Event headers ──▶ correlation ID ─┐
//! Context       ──▶ subject        ─┼─▶ processor.rs (should_skip)
//!                                   │       → history cache (exists_or_store)
//!                                   │       → strategy.rs (action, subject) lookup
//!                                   └─▶ skip → Ok(()) / continue → next handler
//! ```
//!
//! # Design Decisions
//! - An ID is recorded on first sight, before the handler runs
//! - Empty IDs and subjects bypass the cache entirely
//! - A skip is a success; it is only visible in logs and metrics

pub mod processor;
pub mod strategy;

pub use processor::{CorrelationProcessor, ProcessorConfig};
pub use strategy::{SkipStrategy, SubjectSet, WILDCARD};
