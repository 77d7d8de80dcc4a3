//! Event model shared by every subsystem.
//!
//! # Data Flow
//! ```text
//! transport payload (JSON + headers)
//!     → types.rs (Event, Action)
//!     → context.rs (Context: subject, correlation ID, deadline)
//!     → routing / correlation / handlers
//! ```
//!
//! # Design Decisions
//! - Action is a closed enum; unknown actions fail decoding at the transport
//! - Resource identifiers are carried for logs and spans only, never for dispatch
//! - The correlation header key is a single constant shared with `outbound`

pub mod context;
pub mod types;

pub use context::Context;
pub use types::{Action, Event, ParseActionError, CORRELATION_ID_HEADER};
