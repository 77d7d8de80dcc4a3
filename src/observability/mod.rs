//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (subscriber, fmt output, OpenTelemetry bridge)
//!     → metrics.rs (counters, histograms)
//!     → tracing.rs (process-event span with remote parent)
//!
//! Consumers:
//!     → Log aggregation (stdout, pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape)
//!     → Distributed tracing (W3C trace context)
//! ```
//!
//! # Design Decisions
//! - Library code only emits; the binary decides where output goes
//! - Correlation IDs appear as a structured field on every dispatch log
//! - Metric updates are cheap no-ops until a recorder is installed

pub mod logging;
pub mod metrics;
pub mod tracing;
