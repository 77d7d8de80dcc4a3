//! Event processors.
//!
//! A processor owns a set of handlers and registers them on a
//! [`RouterBuilder`] during startup.

pub mod echo;

pub use echo::EchoProcessor;

use crate::routing::RouterBuilder;

pub trait EventProcessor: Send + Sync {
    fn register(&self, router: &mut RouterBuilder);
}
