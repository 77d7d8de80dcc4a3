//! Shutdown coordination.
//!
//! # Responsibilities
//! - Tell subscription pumps and the listener loop to stop taking events
//! - Give in-flight dispatches a bounded grace period before aborting them
//!
//! # Design Decisions
//! - The signal is a latched flag, so a task that subscribes after shutdown
//!   began still stops instead of running forever

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Coordinator for graceful shutdown. Clones share one signal.
#[derive(Clone)]
pub struct Shutdown {
    tx: Arc<watch::Sender<bool>>,
}

/// Receiving side of a [`Shutdown`].
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

impl ShutdownSignal {
    /// Resolve once shutdown has been triggered, immediately if it already was.
    pub async fn recv(&mut self) {
        // A dropped coordinator also counts as shutdown.
        let _ = self.rx.wait_for(|triggered| *triggered).await;
    }

    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow()
    }
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    pub fn subscribe(&self) -> ShutdownSignal {
        ShutdownSignal {
            rx: self.tx.subscribe(),
        }
    }

    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }

    /// Number of tasks still listening.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Trigger shutdown and wait up to `grace` for `task` to finish draining.
    ///
    /// Returns `false` if the grace period ran out and the task was aborted.
    pub async fn drain(&self, mut task: JoinHandle<()>, grace: Duration) -> bool {
        self.trigger();

        match tokio::time::timeout(grace, &mut task).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                tracing::error!(error = %e, "Task ended abnormally while draining");
                true
            }
            Err(_) => {
                tracing::warn!(
                    grace_ms = grace.as_millis() as u64,
                    "Drain timed out, aborting in-flight events"
                );
                task.abort();
                false
            }
        }
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
