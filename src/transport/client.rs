//! Transport client abstraction.

use async_trait::async_trait;
use thiserror::Error;

use crate::events::Event;
use crate::history::BoxError;

/// A decoded event together with the subject it arrived on.
#[derive(Debug, Clone)]
pub struct EventMessage {
    /// Subject without the transport prefix.
    pub subject: String,
    pub event: Event,
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to subscribe to {subject}: {source}")]
    Subscribe {
        subject: String,
        #[source]
        source: BoxError,
    },

    #[error("failed to decode event: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("transport shutdown failed: {0}")]
    Shutdown(#[source] BoxError),
}

/// Subscription side of a message transport.
///
/// Messages are delivered through the receiver handed out when the client is
/// constructed.
#[async_trait]
pub trait EventClient: Send + Sync {
    /// Start receiving events published on `subject`.
    async fn subscribe(&self, subject: &str) -> Result<(), TransportError>;

    /// Stop every subscription and flush the connection.
    async fn shutdown(&self) -> Result<(), TransportError>;
}
