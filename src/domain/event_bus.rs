//! Broadcast channel for pool events.
//!
//! [`EventBus`] wraps a [`tokio::sync::broadcast`] channel. The pool
//! manager publishes a [`PoolEvent`] for every allocation and connection
//! lifecycle change; loggers and diagnostics subscribe to it.

use tokio::sync::broadcast;

use super::PoolEvent;

/// Broadcast bus for [`PoolEvent`]s.
///
/// When the ring buffer is full, the oldest events are dropped for lagging
/// receivers. Publishing never fails and never blocks.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<PoolEvent>,
}

impl EventBus {
    /// Creates a new `EventBus` with the given channel capacity.
    ///
    /// A capacity of zero is raised to one.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of receivers that received the event.
    /// If there are no active receivers, the event is silently dropped.
    pub fn publish(&self, event: PoolEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    /// Creates a new receiver that will receive all future events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<PoolEvent> {
        self.sender.subscribe()
    }

    /// Returns the current number of active receivers.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
