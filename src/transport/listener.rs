//! Event listener: subscribes the router's subjects and drives dispatch.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinSet;

use super::{EventClient, EventMessage, TransportError};
use crate::events::Context;
use crate::lifecycle::ShutdownSignal;
use crate::routing::Router;

pub struct EventListener {
    router: Arc<Router>,
}

impl EventListener {
    pub fn new(router: Arc<Router>) -> Self {
        Self { router }
    }

    /// Subscribe to every subject the router handles. Stops at the first error.
    pub async fn subscribe_all(&self, client: &dyn EventClient) -> Result<(), TransportError> {
        tracing::info!("Subscribing to event subjects");
        for subject in self.router.subjects() {
            tracing::info!(subject = %subject, "Subscribing to subject");
            client.subscribe(&subject).await?;
        }
        Ok(())
    }

    /// Dispatch messages until the channel closes or shutdown fires, then
    /// wait for in-flight dispatches to finish.
    pub async fn run(
        self,
        mut messages: mpsc::Receiver<EventMessage>,
        mut shutdown: ShutdownSignal,
    ) {
        tracing::info!("Starting event listener");
        let mut in_flight = JoinSet::new();

        loop {
            tokio::select! {
                message = messages.recv() => {
                    let Some(message) = message else {
                        tracing::info!("Event channel closed");
                        break;
                    };
                    tracing::debug!(subject = %message.subject, "Received event");
                    in_flight.spawn(dispatch(self.router.clone(), message));
                }
                Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                    if let Err(e) = joined {
                        tracing::error!(error = %e, "Dispatch task panicked");
                    }
                }
                _ = shutdown.recv() => {
                    tracing::info!("Shutdown signal received, stopping event listener");
                    break;
                }
            }
        }

        let pending = in_flight.len();
        if pending > 0 {
            tracing::info!(pending, "Waiting for in-flight events");
        }
        while let Some(joined) = in_flight.join_next().await {
            if let Err(e) = joined {
                tracing::error!(error = %e, "Dispatch task panicked");
            }
        }
        tracing::info!("Event listener stopped");
    }
}

async fn dispatch(router: Arc<Router>, message: EventMessage) {
    let EventMessage { subject, event } = message;
    let action = event.action;

    match router.process(Context::new(), &subject, Arc::new(event)).await {
        Ok(()) => {}
        Err(e) if e.is_not_found() => {
            tracing::warn!(subject = %subject, action = %action, "No handler registered for subject, dropping event");
        }
        Err(e) => {
            tracing::error!(subject = %subject, action = %action, error = %e, "Error processing event");
        }
    }
}
