//! Event Router Service
//!
//! Subscribes to resource events on NATS and dispatches them through the
//! event router, suppressing echoes of this service's own writes.
//!
//! # Architecture Overview
//!
//! ```text
//!                ┌──────────────────────────────────────────────────────────────┐
//!                │                        EVENT ROUTER                          │
//!                │                                                              │
//!   NATS         │  ┌───────────┐   ┌──────────┐   ┌──────────────────────────┐ │
//!   ─────────────┼─▶│ transport │──▶│ listener │──▶│ router                   │ │
//!   <prefix>.<s> │  │ nats.rs   │   │ 1 task / │   │  trace-context mw        │ │
//!                │  └───────────┘   │ message  │   │   └▶ correlation mw ─────┼─┼──▶ history cache
//!                │                  └──────────┘   │        └▶ handler        │ │    (local | NATS KV)
//!                │                                 └──────────────────────────┘ │
//!                │                                                              │
//!                │  ┌────────────────────────────────────────────────────────┐  │
//!                │  │ config │ observability (logs, metrics, spans) │ lifecycle│  │
//!                │  └────────────────────────────────────────────────────────┘  │
//!                └──────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use event_router::config::load_config;
use event_router::lifecycle::signals::wait_for_signal;
use event_router::lifecycle::startup::{build_history_cache, build_router, StartupError};
use event_router::lifecycle::Shutdown;
use event_router::observability::{logging, metrics};
use event_router::processor::EchoProcessor;
use event_router::transport::{EventClient, EventListener, NatsEventClient};

#[derive(Parser)]
#[command(name = "event-router")]
#[command(about = "Routes NATS resource events to handlers, skipping echoed writes", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "event-router.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    logging::init_logging(&config.observability)?;
    tracing::info!("event-router v0.1.0 starting");

    tracing::info!(
        config = %cli.config.display(),
        nats_url = %config.transport.url,
        cache_backend = ?config.history_cache.backend,
        strategy = ?config.correlation.strategy,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let nats = async_nats::connect(config.transport.url.as_str())
        .await
        .map_err(|e| StartupError::Connect {
            url: config.transport.url.clone(),
            source: Box::new(e),
        })?;
    tracing::info!(url = %config.transport.url, "Connected to NATS");

    let cache = build_history_cache(&config.history_cache, &nats).await?;
    let echo = EchoProcessor::from_config(&config.routes);
    let router = Arc::new(build_router(&config, cache, &[&echo]));

    let (client, messages) = NatsEventClient::new(nats, &config.transport);
    let listener = EventListener::new(router);
    listener.subscribe_all(&client).await?;

    let shutdown = Shutdown::new();
    let listener_task = tokio::spawn(listener.run(messages, shutdown.subscribe()));

    wait_for_signal().await;

    if let Err(e) = client.shutdown().await {
        tracing::warn!(error = %e, "Error shutting down NATS client");
    }
    let grace = Duration::from_secs(config.transport.drain_timeout_secs);
    if !shutdown.drain(listener_task, grace).await {
        tracing::warn!("Some in-flight events did not finish before the drain timeout");
    }

    logging::shutdown_logging();
    tracing::info!("Shutdown complete");
    Ok(())
}
