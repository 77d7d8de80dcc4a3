//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Setup (single-threaded):
//!     RouterBuilder::route(subject, action, handler, route middlewares)
//!     RouterBuilder::use_middleware(global middleware)
//!     → build(): wrap every handler in the global chain once
//!     → Freeze as immutable Router
//!
//! Dispatch (concurrent):
//!     process(ctx, subject, event)
//!     → subject lookup (NotFound if unknown)
//!     → subject into context
//!     → action lookup (silent no-op if unbound)
//!     → composed handler
//! ```
//!
//! # Design Decisions
//! - Registration and dispatch are separate types, so no route can change while serving
//! - Middleware chains are composed at build time, never per dispatch
//! - Global middleware is a stack: the last one added runs first
//! - Last registration of a (subject, action) wins

pub mod error;
pub mod middleware;
pub mod router;

pub use error::RouterError;
pub use middleware::{handler_fn, middleware_fn, Handler, HandlerFuture, Middleware};
pub use router::{Router, RouterBuilder};
