//! Transport adapter.
//!
//! # Data Flow
//! ```text
//! NATS queue subscriptions (<prefix>.<subject>)
//!     → nats.rs (decode JSON, copy correlation header, strip prefix)
//!     → mpsc channel of EventMessage
//!     → listener.rs (one task per message)
//!     → Router::process
//! ```
//!
//! # Design Decisions
//! - The router only sees decoded events; it never touches NATS types
//! - Undecodable payloads are logged and dropped at the edge
//! - NotFound is a warning, not a failure of the loop
//! - Shutdown stops intake first, then waits for in-flight dispatches

pub mod client;
pub mod listener;
pub mod nats;

pub use client::{EventClient, EventMessage, TransportError};
pub use listener::EventListener;
pub use nats::NatsEventClient;
