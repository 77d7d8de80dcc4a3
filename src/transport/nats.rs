//! NATS implementation of [`EventClient`].

use std::collections::HashMap;

use async_nats::{HeaderMap, Subscriber};
use async_trait::async_trait;
use futures_util::StreamExt;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::{EventClient, EventMessage, TransportError};
use crate::config::TransportConfig;
use crate::events::Event;
use crate::lifecycle::{Shutdown, ShutdownSignal};

/// Queue-group subscriber that forwards decoded events into a channel.
pub struct NatsEventClient {
    client: async_nats::Client,
    prefix: String,
    queue_group: String,
    queue_size: usize,
    sender: mpsc::Sender<EventMessage>,
    shutdown: Shutdown,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl NatsEventClient {
    /// Create a client over an established connection.
    ///
    /// Returns the client and the receiver carrying decoded events.
    pub fn new(
        client: async_nats::Client,
        config: &TransportConfig,
    ) -> (Self, mpsc::Receiver<EventMessage>) {
        let (sender, receiver) = mpsc::channel(config.channel_capacity.max(1));

        (
            Self {
                client,
                prefix: config.subject_prefix.clone(),
                queue_group: config.queue_group.clone(),
                queue_size: config.queue_size.max(1),
                sender,
                shutdown: Shutdown::new(),
                tasks: Mutex::new(Vec::new()),
            },
            receiver,
        )
    }

    fn full_subject(&self, subject: &str) -> String {
        if self.prefix.is_empty() {
            subject.to_string()
        } else {
            format!("{}.{}", self.prefix, subject)
        }
    }
}

#[async_trait]
impl EventClient for NatsEventClient {
    async fn subscribe(&self, subject: &str) -> Result<(), TransportError> {
        let full_subject = self.full_subject(subject);

        for queue in 0..self.queue_size {
            let subscriber = self
                .client
                .queue_subscribe(full_subject.clone(), self.queue_group.clone())
                .await
                .map_err(|e| TransportError::Subscribe {
                    subject: full_subject.clone(),
                    source: Box::new(e),
                })?;

            tracing::debug!(subject = %full_subject, queue, component = "nats", "Subscribed to NATS subject");

            let task = tokio::spawn(forward(
                subscriber,
                self.prefix.clone(),
                self.sender.clone(),
                self.shutdown.subscribe(),
            ));
            self.tasks.lock().push(task);
        }

        Ok(())
    }

    async fn shutdown(&self) -> Result<(), TransportError> {
        tracing::info!(component = "nats", "Shutting down NATS client");
        self.shutdown.trigger();

        let tasks = std::mem::take(&mut *self.tasks.lock());
        for task in tasks {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "Subscription task ended abnormally");
            }
        }

        self.client
            .flush()
            .await
            .map_err(|e| TransportError::Shutdown(Box::new(e)))
    }
}

/// Pump one subscription into the event channel until shutdown.
async fn forward(
    mut subscriber: Subscriber,
    prefix: String,
    sender: mpsc::Sender<EventMessage>,
    mut shutdown: ShutdownSignal,
) {
    loop {
        tokio::select! {
            message = subscriber.next() => {
                let Some(message) = message else { break };
                tracing::debug!(subject = %message.subject, component = "nats", "Received message");

                let headers = message.headers.as_ref().map(header_map);

                match decode_message(&prefix, &message.subject, &message.payload, headers) {
                    Ok(decoded) => {
                        if sender.send(decoded).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::error!(subject = %message.subject, error = %e, "Error decoding event");
                    }
                }
            }
            _ = shutdown.recv() => {
                if let Err(e) = subscriber.unsubscribe().await {
                    tracing::warn!(error = %e, component = "nats", "Error unsubscribing from NATS");
                }
                break;
            }
        }
    }
}

/// Flatten NATS headers to one value per name, keeping the first value.
pub fn header_map(headers: &HeaderMap) -> HashMap<String, String> {
    headers
        .iter()
        .filter_map(|(name, values)| {
            let value = values.first()?;
            Some((name.to_string(), value.as_str().to_string()))
        })
        .collect()
}

/// Decode a raw message into an [`EventMessage`].
///
/// Transport headers, when the message carries any, replace the header map
/// inside the payload. `prefix.` is stripped from the subject.
pub fn decode_message(
    prefix: &str,
    subject: &str,
    payload: &[u8],
    headers: Option<HashMap<String, String>>,
) -> Result<EventMessage, TransportError> {
    let mut event: Event = serde_json::from_slice(payload)?;

    if let Some(headers) = headers {
        event.headers = headers;
    }

    let subject = if prefix.is_empty() {
        subject
    } else {
        subject
            .strip_prefix(prefix)
            .and_then(|rest| rest.strip_prefix('.'))
            .unwrap_or(subject)
    };

    Ok(EventMessage {
        subject: subject.to_string(),
        event,
    })
}
