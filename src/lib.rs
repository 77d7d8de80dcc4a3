//! Event dispatch router with correlation-ID loop suppression.

pub mod config;
pub mod correlation;
pub mod events;
pub mod history;
pub mod lifecycle;
pub mod observability;
pub mod outbound;
pub mod processor;
pub mod routing;
pub mod transport;

pub use config::ServiceConfig;
pub use correlation::{CorrelationProcessor, SkipStrategy};
pub use events::{Action, Context, Event, CORRELATION_ID_HEADER};
pub use history::{HistoryCache, KvCache, LocalCache};
pub use routing::{handler_fn, middleware_fn, Handler, Middleware, Router, RouterBuilder, RouterError};
