//! Logging for pool events.
//!
//! The pool itself only publishes [`PoolEvent`]s. This module turns them
//! into `tracing` records and offers a default subscriber setup for
//! applications that have none.

use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::domain::{EventBus, PoolEvent};

/// Installs a global `tracing` subscriber filtered by `RUST_LOG`
/// (default `info`), writing JSON lines when `json` is set and plain text
/// otherwise.
///
/// # Errors
///
/// Returns [`TryInitError`] if a global subscriber is already installed.
pub fn init_tracing(json: bool) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json_layer = json.then(|| fmt::layer().json().with_target(true));
    let text_layer = (!json).then(|| fmt::layer().with_target(true));

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .try_init()
}

/// Spawns a task that logs every event published on `event_bus`.
///
/// The subscription is taken before this returns, so no event published
/// afterwards is missed. The task ends once every sender of the bus is
/// dropped. Must be called from within a tokio runtime.
#[must_use]
pub fn spawn_event_logger(event_bus: &EventBus) -> JoinHandle<()> {
    let mut rx = event_bus.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => log_event(&event),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "event logger lagged, events dropped");
                }
                Err(RecvError::Closed) => break,
            }
        }
        tracing::debug!("event bus closed, event logger stopping");
    })
}

fn log_event(event: &PoolEvent) {
    match serde_json::to_string(event) {
        Ok(json) => tracing::info!(
            event_type = event.event_type_str(),
            event = %json,
            "pool event"
        ),
        Err(err) => tracing::warn!(
            event_type = event.event_type_str(),
            %err,
            "failed to serialize pool event"
        ),
    }
}
